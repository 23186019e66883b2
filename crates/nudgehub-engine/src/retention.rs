//! Housekeeping jobs for the run-history table.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use nudgehub_core::traits::ProcessStore;

/// Prunes old run records and reaps runs stuck in `running`.
///
/// Both jobs are best-effort: a failure is logged and retried at the
/// next scheduled fire.
#[derive(Debug)]
pub struct RetentionJobs {
    processes: Arc<dyn ProcessStore>,
    retention_days: i64,
    stale_hours: i64,
}

impl RetentionJobs {
    /// Create the retention job pair.
    pub fn new(processes: Arc<dyn ProcessStore>, retention_days: i64, stale_hours: i64) -> Self {
        Self {
            processes,
            retention_days,
            stale_hours,
        }
    }

    /// Delete run records older than the retention window.
    pub async fn prune_history(&self) {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        match self.processes.prune_older_than(cutoff).await {
            Ok(0) => info!("Run-history prune: nothing to remove"),
            Ok(removed) => info!("Run-history prune removed {removed} records"),
            Err(e) => warn!("Run-history prune failed: {e}"),
        }
    }

    /// Mark runs stuck in `running` beyond the stale window as failed.
    /// A record this old belongs to a crashed or killed process.
    pub async fn reap_stale_runs(&self) {
        let cutoff = Utc::now() - Duration::hours(self.stale_hours);
        match self.processes.fail_stale_running(cutoff).await {
            Ok(0) => {}
            Ok(reaped) => warn!("Marked {reaped} stale running records as failed"),
            Err(e) => warn!("Stale-run reap failed: {e}"),
        }
    }
}
