// ==================== RAZORPAY ORDERS API ====================
// Thin client for order creation. Only the orders endpoint is used;
// payment capture happens on the client side and is confirmed through
// the signed callback handled by payment_service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Order descriptor returned by the gateway and forwarded to the caller.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor currency units (paise for INR).
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: String,
    #[serde(default)]
    pub status: String,
}

/// Narrow seam over the gateway so the payment orchestration is testable
/// without network calls.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, String>;
}

pub struct RazorpayClient {
    key_id: String,
    key_secret: String,
    client: reqwest::Client,
}

impl RazorpayClient {
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let key_id = env::var("RAZORPAY_KEY")
            .map_err(|_| "RAZORPAY_KEY not found in environment".to_string())?;
        let key_secret = env::var("RAZORPAY_SECRET")
            .map_err(|_| "RAZORPAY_SECRET not found in environment".to_string())?;
        Ok(Self::new(&key_id, &key_secret))
    }
}

#[async_trait]
impl OrderGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, String> {
        log::info!("💳 Creating Razorpay order: {} {} (receipt {})", amount, currency, receipt);

        let url = format!("{}/orders", RAZORPAY_API_BASE);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| format!("Failed to reach Razorpay: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Razorpay API error: {}", response.status()));
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Razorpay response: {}", e))?;

        log::info!("✅ Razorpay order created: {}", order.id);
        Ok(order)
    }
}
