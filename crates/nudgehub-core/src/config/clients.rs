//! Partner service client configuration.

use serde::{Deserialize, Serialize};

/// Canvas learning-provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Base URL of the Canvas API (e.g. `https://canvas.example.edu/api/v1`).
    pub base_url: String,
    /// Bearer token for API authentication.
    pub token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Groups user-source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsConfig {
    /// Base URL of the groups service.
    pub base_url: String,
    /// Bearer token for API authentication.
    pub token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Notification gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Base URL of the notification gateway.
    pub base_url: String,
    /// Bearer token for API authentication.
    pub token: String,
    /// Subject line used for outbound nudge messages.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_subject() -> String {
    "A nudge from your learning platform".to_string()
}
