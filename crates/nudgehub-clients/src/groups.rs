//! Groups user-source client.

use std::time::Duration;

use async_trait::async_trait;

use nudgehub_core::config::clients::GroupsConfig;
use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::UserSource;
use nudgehub_entity::user::EndUser;

/// Bearer-token client for the groups service.
#[derive(Debug, Clone)]
pub struct GroupsClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl GroupsClient {
    /// Create a new groups client from configuration.
    pub fn new(config: &GroupsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to build groups HTTP client",
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
impl UserSource for GroupsClient {
    async fn get_users(&self, group: &str) -> AppResult<Vec<EndUser>> {
        let url = format!("{}/groups/{}/members", self.base_url, group);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Groups request failed for '{group}'"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Groups service returned {status} for '{group}'"
            )));
        }

        response.json::<Vec<EndUser>>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Groups response decode failed for '{group}'"),
                e,
            )
        })
    }
}
