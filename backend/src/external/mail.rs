//! HTTP mail relay client
//!
//! Posts plain-text messages as JSON to a transactional mail relay

use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Mail relay client
#[derive(Clone)]
pub struct MailRelayClient {
    client: Client,
    relay_url: String,
    api_key: Option<String>,
}

/// A plain-text email
#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

impl MailRelayClient {
    /// Create a new MailRelayClient
    pub fn new(relay_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            relay_url,
            api_key,
        }
    }

    /// Build a client when a relay endpoint is configured
    pub fn from_config(config: &MailConfig) -> Option<Self> {
        let relay_url = config.relay_url.clone().filter(|url| !url.trim().is_empty())?;
        Some(Self::new(relay_url, config.api_key.clone()))
    }

    /// Deliver a message through the relay
    pub async fn send(&self, message: &MailMessage) -> AppResult<()> {
        let mut request = self.client.post(&self.relay_url).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::MailRelay(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MailRelay(format!("{} - {}", status, body)));
        }

        Ok(())
    }
}
