//! Canvas learning-provider client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use nudgehub_core::config::clients::CanvasConfig;
use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::LearningProvider;
use nudgehub_entity::assignment::Assignment;

/// Canvas user payload; only the field we ask for via `include[]`.
#[derive(Debug, Deserialize)]
struct CanvasUser {
    last_login: Option<DateTime<Utc>>,
}

/// Canvas assignment payload as returned by the submissions endpoints.
#[derive(Debug, Deserialize)]
struct CanvasAssignment {
    id: i64,
    name: Option<String>,
    due_at: Option<DateTime<Utc>>,
}

/// Bearer-token client for the Canvas REST API.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl CanvasClient {
    /// Create a new Canvas client from configuration.
    pub fn new(config: &CanvasConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to build Canvas HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }

    /// GET a JSON resource with bearer authentication.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Canvas request failed: {path}"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Canvas returned {status} for {path}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Canvas response decode failed: {path}"),
                e,
            )
        })
    }

    fn map_assignments(raw: Vec<CanvasAssignment>) -> Vec<Assignment> {
        raw.into_iter()
            .filter_map(|a| {
                // Assignments without a due date cannot participate in
                // any time-threshold rule.
                let due_at = a.due_at?;
                Some(Assignment {
                    id: a.id.to_string(),
                    name: a.name.unwrap_or_default(),
                    due_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LearningProvider for CanvasClient {
    async fn get_last_login(&self, external_id: &str) -> AppResult<Option<DateTime<Utc>>> {
        let user: CanvasUser = self
            .get_json(&format!(
                "/users/sis_user_id:{external_id}?include[]=last_login"
            ))
            .await?;
        Ok(user.last_login)
    }

    async fn get_missed_assignments(&self, external_id: &str) -> AppResult<Vec<Assignment>> {
        let raw: Vec<CanvasAssignment> = self
            .get_json(&format!(
                "/users/sis_user_id:{external_id}/missed_submissions"
            ))
            .await?;
        Ok(Self::map_assignments(raw))
    }

    async fn get_completed_assignments(&self, external_id: &str) -> AppResult<Vec<Assignment>> {
        let raw: Vec<CanvasAssignment> = self
            .get_json(&format!(
                "/users/sis_user_id:{external_id}/graded_submissions"
            ))
            .await?;
        Ok(Self::map_assignments(raw))
    }
}
