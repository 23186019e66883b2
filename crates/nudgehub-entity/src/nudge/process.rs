//! Nudge cycle run-record entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status of a cycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "nudge_process_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// The cycle is currently executing.
    Running,
    /// The cycle completed without a fatal error.
    Succeeded,
    /// The cycle aborted (nudge or user load failed).
    Failed,
}

impl ProcessStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One cycle execution record. Used for admin listing and observability,
/// never for control flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NudgeProcess {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// When the cycle finished (None while running).
    pub completed_at: Option<DateTime<Utc>>,
    /// Run status.
    pub status: ProcessStatus,
    /// Error message when the run failed.
    pub error_message: Option<String>,
}
