use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the Razorpay confirmation signature:
/// hex(HMAC-SHA256(secret, "{order_id}|{payment_id}")).
pub fn sign_payment(secret: &str, order_id: &str, payment_id: &str) -> Result<String, String> {
    let body = format!("{}|{}", order_id, payment_id);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("Invalid HMAC key: {}", e))?;
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a gateway-provided signature against the shared secret.
/// Comparison is constant-time via `Mac::verify_slice`. Malformed hex or a
/// bad key verify as false rather than erroring.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let body = format!("{}|{}", order_id, payment_id);
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}
