//! Engine configuration entity (singleton row).

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::sent::NudgeMode;

/// Global engine configuration, mutated by admins.
///
/// A single row (`id = 1`). An update that changes `process_time` must
/// cause the scheduler to be torn down and re-armed for the new moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NudgeConfig {
    /// Singleton key, always `1`.
    pub id: i32,
    /// Whether the engine runs at all.
    pub enabled: bool,
    /// Group name of the production audience.
    pub production_group: String,
    /// Group name of the test audience.
    pub test_group: String,
    /// When set, cycles run against the test audience and ledger rows
    /// are stamped with the `test` mode.
    pub test_mode: bool,
    /// Desired time-of-day (`"HH:MM:SS"`) to run, in the reference timezone.
    pub process_time: String,
    /// How many users are processed per block within a cycle.
    pub block_size: i32,
    /// When the configuration was last updated.
    pub updated_at: DateTime<Utc>,
}

impl NudgeConfig {
    /// Parse `process_time` as a time-of-day. `None` when malformed.
    pub fn process_time_of_day(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.process_time, "%H:%M:%S").ok()
    }

    /// The group the current mode draws its population from.
    pub fn audience_group(&self) -> &str {
        if self.test_mode {
            &self.test_group
        } else {
            &self.production_group
        }
    }

    /// The ledger mode tag for the current audience.
    pub fn mode(&self) -> NudgeMode {
        if self.test_mode {
            NudgeMode::Test
        } else {
            NudgeMode::Normal
        }
    }
}
