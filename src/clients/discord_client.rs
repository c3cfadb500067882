use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::{BotError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send_message(&self, content: &str) -> Result<()>;
}

pub struct DiscordWebhookClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordWebhookClient {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl WebhookSender for DiscordWebhookClient {
    async fn send_message(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                service: "discord",
                status: status.as_u16(),
                body,
            });
        }
        debug!("webhook message delivered");
        Ok(())
    }
}
