// ==================== MAIL DELIVERY ====================
// Delivery goes through an HTTP mail API (Resend-style JSON POST).
// Callers treat sends as fire-and-forget; enrollment never rolls back
// because a notification failed.

pub mod templates;

use async_trait::async_trait;
use std::env;

/// Narrow seam over email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String>;
}

pub struct HttpMailer {
    api_url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: &str, from: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("MAIL_API_URL")
            .map_err(|_| "MAIL_API_URL not found in environment".to_string())?;
        let api_key = env::var("MAIL_API_KEY")
            .map_err(|_| "MAIL_API_KEY not found in environment".to_string())?;
        let from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "StudyNotion <no-reply@studynotion.dev>".to_string());
        Ok(Self::new(&api_url, &api_key, &from))
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        log::info!("📧 Sending mail to {}: {}", to, subject);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html_body,
            }))
            .send()
            .await
            .map_err(|e| format!("Failed to reach mail API: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Mail API error: {}", response.status()));
        }

        Ok(())
    }
}
