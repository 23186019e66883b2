//! Nudge engine configuration.
//!
//! These are deployment-level settings. The runtime schedule (process
//! time, audience groups, block size) lives in the `nudge_config` table
//! and is mutated by admins; the values here are the fallbacks applied
//! when that row is missing or invalid.

use serde::{Deserialize, Serialize};

/// Nudge engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes east of UTC for the reference timezone used to project
    /// the configured time-of-day onto a wall-clock instant.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Fallback time-of-day (`"HH:MM:SS"`) when `nudge_config` has no
    /// valid `process_time`.
    #[serde(default = "default_process_time")]
    pub default_process_time: String,
    /// Rearm period in hours after each cycle fires.
    #[serde(default = "default_period_hours")]
    pub period_hours: u64,
    /// Fallback user-block size when `nudge_config` has none.
    #[serde(default = "default_block_size")]
    pub default_block_size: usize,
    /// Fallback threshold (hours) when a nudge's parameter bag has no
    /// usable `hours` value.
    #[serde(default = "default_threshold_hours")]
    pub default_threshold_hours: f64,
    /// Time-of-day at which the run-history prune job fires.
    #[serde(default = "default_history_prune_time")]
    pub history_prune_time: String,
    /// Days of run history to retain.
    #[serde(default = "default_history_retention_days")]
    pub history_retention_days: i64,
    /// Time-of-day at which the stale-run reaper fires.
    #[serde(default = "default_reaper_time")]
    pub reaper_time: String,
    /// Hours after which a `running` process record is considered stuck.
    #[serde(default = "default_stale_running_hours")]
    pub stale_running_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            default_process_time: default_process_time(),
            period_hours: default_period_hours(),
            default_block_size: default_block_size(),
            default_threshold_hours: default_threshold_hours(),
            history_prune_time: default_history_prune_time(),
            history_retention_days: default_history_retention_days(),
            reaper_time: default_reaper_time(),
            stale_running_hours: default_stale_running_hours(),
        }
    }
}

fn default_process_time() -> String {
    "08:00:00".to_string()
}

fn default_period_hours() -> u64 {
    24
}

fn default_block_size() -> usize {
    50
}

fn default_threshold_hours() -> f64 {
    336.0
}

fn default_history_prune_time() -> String {
    "02:00:00".to_string()
}

fn default_history_retention_days() -> i64 {
    90
}

fn default_reaper_time() -> String {
    "02:30:00".to_string()
}

fn default_stale_running_hours() -> i64 {
    24
}
