//! Chat integration -- post digests to an incoming webhook (Google Chat).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, DigestError, Result};
use crate::integrations::traits::Publisher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ChatWebhook {
    http: Client,
    webhook_url: Url,
}

impl ChatWebhook {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let webhook_url = Url::parse(webhook_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "chat.webhook_url".into(),
                message: "must be an http(s) URL".into(),
            })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DigestError::Publish(e.to_string()))?;

        Ok(Self { http, webhook_url })
    }
}

#[async_trait]
impl Publisher for ChatWebhook {
    /// Post `{"text": ...}` once; any 2xx response counts as delivered.
    async fn publish(&self, text: &str) -> Result<()> {
        let body = json!({ "text": text });
        debug!(bytes = text.len(), "posting digest to chat webhook");

        let resp = self
            .http
            .post(self.webhook_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::Publish(e.without_url().to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(DigestError::Publish(format!(
                "chat webhook error (HTTP {status}): {text}"
            )))
        }
    }
}
