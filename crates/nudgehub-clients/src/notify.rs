//! Notification gateway client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use nudgehub_core::config::clients::NotificationsConfig;
use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::NotificationGateway;

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    recipients: &'a [String],
    subject: &'a str,
    body: &'a str,
}

/// Bearer-token client for the outbound notification gateway.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl NotifyClient {
    /// Create a new gateway client from configuration.
    pub fn new(config: &NotificationsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to build notification HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }
}

#[async_trait]
impl NotificationGateway for NotifyClient {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> AppResult<()> {
        let url = format!("{}/messages", self.base_url);
        let message = OutboundMessage {
            recipients,
            subject,
            body,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Notification send failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Notification gateway returned {status}"
            )));
        }

        debug!(recipients = recipients.len(), "Notification delivered to gateway");
        Ok(())
    }
}
