//! Nudge rule entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A behavioral rule that may trigger a notification for a user.
///
/// The `nudge_type` field acts as the type discriminator dispatched to
/// the matching evaluator (`"last_login"`, `"missed_assignment"`,
/// `"completed_assignment_early"`). Nudges are created and edited by
/// admins and are read-only during a processing cycle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Nudge {
    /// Unique nudge identifier.
    pub id: Uuid,
    /// Type discriminator selecting the evaluator.
    pub nudge_type: String,
    /// Display name.
    pub name: String,
    /// Message body. May contain one `{}` placeholder filled with the
    /// qualification detail (e.g. an assignment name).
    pub message: String,
    /// Deep link included with the notification.
    pub link: Option<String>,
    /// Free-form parameter bag (e.g. `{"hours": 336}`).
    pub params: serde_json::Value,
    /// Whether this nudge participates in processing cycles.
    pub active: bool,
    /// Population sources feeding this rule (group names, course IDs).
    pub user_sources: serde_json::Value,
    /// When the nudge was created.
    pub created_at: DateTime<Utc>,
    /// When the nudge was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Nudge {
    /// Read the `hours` threshold from the parameter bag, falling back
    /// to the supplied default when absent or not a number.
    pub fn threshold_hours(&self, default: f64) -> f64 {
        self.params
            .get("hours")
            .and_then(|v| v.as_f64())
            .unwrap_or(default)
    }
}

/// Data required to create a new nudge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNudge {
    /// Type discriminator.
    pub nudge_type: String,
    /// Display name.
    pub name: String,
    /// Message body.
    pub message: String,
    /// Deep link.
    pub link: Option<String>,
    /// Free-form parameter bag.
    pub params: serde_json::Value,
    /// Whether the nudge starts active.
    pub active: bool,
    /// Population sources.
    pub user_sources: serde_json::Value,
}
