//! Missed-assignment evaluator.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use nudgehub_core::result::AppResult;
use nudgehub_core::traits::LearningProvider;
use nudgehub_entity::nudge::model::Nudge;
use nudgehub_entity::user::EndUser;

use crate::fingerprint::{canonical_hours, fingerprint};

use super::{NudgeEvaluator, Qualification};

/// Qualifies once per assignment whose due time is more than the `hours`
/// threshold in the past and which the provider reports as unsubmitted.
///
/// The fingerprint covers the assignment ID and the threshold only, not
/// the due date: an instructor shifting a deadline must not re-notify
/// every user who was already nudged about that assignment. The trade-off
/// is that a genuinely new deadline for the same assignment ID stays
/// suppressed too.
#[derive(Debug)]
pub struct MissedAssignmentEvaluator {
    provider: Arc<dyn LearningProvider>,
    default_threshold_hours: f64,
}

impl MissedAssignmentEvaluator {
    /// Create a new missed-assignment evaluator.
    pub fn new(provider: Arc<dyn LearningProvider>, default_threshold_hours: f64) -> Self {
        Self {
            provider,
            default_threshold_hours,
        }
    }
}

#[async_trait]
impl NudgeEvaluator for MissedAssignmentEvaluator {
    fn nudge_type(&self) -> &str {
        "missed_assignment"
    }

    async fn evaluate(&self, nudge: &Nudge, user: &EndUser) -> AppResult<Vec<Qualification>> {
        let threshold_hours = nudge.threshold_hours(self.default_threshold_hours);
        let assignments = self
            .provider
            .get_missed_assignments(&user.external_id)
            .await?;

        let now = Utc::now();
        let quals = assignments
            .into_iter()
            .filter(|a| {
                let overdue_hours = (now - a.due_at).num_seconds() as f64 / 3600.0;
                overdue_hours > threshold_hours
            })
            .map(|a| Qualification {
                fingerprint: fingerprint(&[&a.id, &canonical_hours(threshold_hours)]),
                detail: Some(a.name),
            })
            .collect();

        Ok(quals)
    }
}
