//! Criteria evaluators — one strategy per nudge type.
//!
//! Each evaluator decides whether a given user currently satisfies the
//! nudge's trigger condition and computes a stable fingerprint of the
//! qualifying facts. Evaluators are registered in an [`EvaluatorRegistry`]
//! keyed by the nudge-type discriminator; unknown discriminators are an
//! explicit miss, not a default branch.

pub mod completed_early;
pub mod last_login;
pub mod missed_assignment;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use nudgehub_core::result::AppResult;
use nudgehub_entity::nudge::model::Nudge;
use nudgehub_entity::user::EndUser;

pub use completed_early::CompletedAssignmentEarlyEvaluator;
pub use last_login::LastLoginEvaluator;
pub use missed_assignment::MissedAssignmentEvaluator;

/// One satisfied trigger condition for a (nudge, user) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualification {
    /// Deterministic hash of the qualifying facts.
    pub fingerprint: u32,
    /// Optional detail substituted into the message placeholder
    /// (e.g. an assignment name or a day count).
    pub detail: Option<String>,
}

/// Trait for per-nudge-type qualification strategies.
///
/// An empty result means the user does not qualify; multiple entries mean
/// multiple independent conditions qualified (one per missed assignment,
/// for example). "Does not qualify" is a normal outcome, never an error.
#[async_trait]
pub trait NudgeEvaluator: Send + Sync + std::fmt::Debug {
    /// The nudge-type discriminator this evaluator handles.
    fn nudge_type(&self) -> &str;

    /// Evaluate the nudge's trigger condition for one user.
    async fn evaluate(&self, nudge: &Nudge, user: &EndUser) -> AppResult<Vec<Qualification>>;
}

/// Dispatches nudges to the appropriate evaluator based on `nudge_type`.
#[derive(Debug, Default)]
pub struct EvaluatorRegistry {
    /// Registered evaluators by nudge type.
    evaluators: HashMap<String, Arc<dyn NudgeEvaluator>>,
}

impl EvaluatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    /// Register an evaluator.
    pub fn register(&mut self, evaluator: Arc<dyn NudgeEvaluator>) {
        let nudge_type = evaluator.nudge_type().to_string();
        info!("Registered evaluator for nudge type '{}'", nudge_type);
        self.evaluators.insert(nudge_type, evaluator);
    }

    /// Look up the evaluator for a nudge type. `None` means the type is
    /// unsupported and the caller should skip it with a diagnostic.
    pub fn get(&self, nudge_type: &str) -> Option<Arc<dyn NudgeEvaluator>> {
        self.evaluators.get(nudge_type).cloned()
    }

    /// Get the list of registered nudge types.
    pub fn registered_types(&self) -> Vec<String> {
        self.evaluators.keys().cloned().collect()
    }
}
