//! Sent-nudge ledger entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audience mode a ledger entry was written under.
///
/// Mode participates in the dedup key so that test runs never suppress
/// production notifications (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "nudge_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NudgeMode {
    /// Production audience.
    Normal,
    /// Test audience.
    Test,
}

impl NudgeMode {
    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for NudgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry: one notified (nudge, user, fingerprint) tuple.
///
/// Immutable once written. The fingerprint is a 32-bit hash of the facts
/// that made the nudge qualify; it is stored widened to `i64` because
/// PostgreSQL has no unsigned integer type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SentNudge {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The nudge that fired.
    pub nudge_id: Uuid,
    /// Internal user identifier.
    pub user_id: Uuid,
    /// External (SIS/LMS) user identifier.
    pub external_user_id: String,
    /// Condition fingerprint (32-bit, widened).
    pub fingerprint: i64,
    /// Audience mode at send time.
    pub mode: NudgeMode,
    /// When the notification was sent.
    pub sent_at: DateTime<Utc>,
}

impl SentNudge {
    /// The fingerprint narrowed back to its 32-bit domain value.
    pub fn fingerprint_u32(&self) -> u32 {
        self.fingerprint as u32
    }
}


/// Data required to record a new ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSentNudge {
    /// The nudge that fired.
    pub nudge_id: Uuid,
    /// Internal user identifier.
    pub user_id: Uuid,
    /// External user identifier.
    pub external_user_id: String,
    /// Condition fingerprint.
    pub fingerprint: u32,
    /// Audience mode.
    pub mode: NudgeMode,
    /// When the notification was sent.
    pub sent_at: DateTime<Utc>,
}
