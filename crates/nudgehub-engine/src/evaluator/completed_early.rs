//! Completed-assignment-early evaluator (intentionally disabled).

use std::sync::Arc;

use async_trait::async_trait;

use nudgehub_core::result::AppResult;
use nudgehub_core::traits::LearningProvider;
use nudgehub_entity::nudge::model::Nudge;
use nudgehub_entity::user::EndUser;

use super::{NudgeEvaluator, Qualification};

/// Evaluator stub for the `completed_assignment_early` nudge type.
///
/// No trigger condition has ever been settled for this rule: the
/// completed-assignment data is fetched, but no user qualifies and no
/// notification is sent. Registering a no-op keeps the type supported
/// (admins can save such nudges without "unsupported type" diagnostics)
/// until a condition is agreed.
#[derive(Debug)]
pub struct CompletedAssignmentEarlyEvaluator {
    provider: Arc<dyn LearningProvider>,
}

impl CompletedAssignmentEarlyEvaluator {
    /// Create a new completed-early evaluator.
    pub fn new(provider: Arc<dyn LearningProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl NudgeEvaluator for CompletedAssignmentEarlyEvaluator {
    fn nudge_type(&self) -> &str {
        "completed_assignment_early"
    }

    async fn evaluate(&self, _nudge: &Nudge, user: &EndUser) -> AppResult<Vec<Qualification>> {
        let _completed = self
            .provider
            .get_completed_assignments(&user.external_id)
            .await?;
        Ok(Vec::new())
    }
}
