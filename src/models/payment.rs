use serde::Deserialize;

// Request bodies for the payment endpoints. Fields default to empty so a
// missing field surfaces as a validation failure with the uniform
// {success, message} envelope instead of a deserialization error.

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CapturePaymentRequest {
    #[serde(default)]
    pub courses: Vec<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PaymentSuccessEmailRequest {
    #[serde(default, rename = "orderId")]
    pub order_id: String,
    #[serde(default, rename = "paymentId")]
    pub payment_id: String,
    /// Amount in minor currency units, as returned by the gateway.
    #[serde(default)]
    pub amount: i64,
}
