//! Combined user-activity snapshot.
//!
//! Fetches the independent read-only aggregates for one user in parallel
//! and joins them, failing with the first error. This fan-out pattern is
//! for ad hoc combined reads only; the nudge cycle itself processes users
//! sequentially.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nudgehub_core::result::AppResult;
use nudgehub_core::traits::LearningProvider;
use nudgehub_entity::assignment::Assignment;

/// Everything the learning provider knows about one user's activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivitySnapshot {
    /// Most recent login, if any.
    pub last_login: Option<DateTime<Utc>>,
    /// Overdue, unsubmitted assignments.
    pub missed_assignments: Vec<Assignment>,
    /// Submitted assignments.
    pub completed_assignments: Vec<Assignment>,
}

/// Aggregates independent provider reads for a single user.
#[derive(Debug, Clone)]
pub struct ActivityService {
    provider: Arc<dyn LearningProvider>,
}

impl ActivityService {
    /// Create a new activity service.
    pub fn new(provider: Arc<dyn LearningProvider>) -> Self {
        Self { provider }
    }

    /// Fetch all three aggregates in parallel; the first error wins.
    pub async fn snapshot(&self, external_id: &str) -> AppResult<UserActivitySnapshot> {
        let (last_login, missed_assignments, completed_assignments) = tokio::try_join!(
            self.provider.get_last_login(external_id),
            self.provider.get_missed_assignments(external_id),
            self.provider.get_completed_assignments(external_id),
        )?;

        Ok(UserActivitySnapshot {
            last_login,
            missed_assignments,
            completed_assignments,
        })
    }
}
