//! Learning-provider contract (Canvas-like).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nudgehub_entity::assignment::Assignment;

use crate::result::AppResult;

/// Read-only access to per-user learning activity.
///
/// All lookups are keyed by the user's external (SIS/LMS) identifier.
/// Implementations fetch fresh data on every call; the engine never
/// caches across cycles.
#[async_trait]
pub trait LearningProvider: Send + Sync + std::fmt::Debug {
    /// The user's most recent login instant, or `None` if the provider
    /// has no login data for them.
    async fn get_last_login(&self, external_id: &str) -> AppResult<Option<DateTime<Utc>>>;

    /// Assignments past their due date that the provider reports as
    /// not submitted.
    async fn get_missed_assignments(&self, external_id: &str) -> AppResult<Vec<Assignment>>;

    /// Assignments the user has submitted.
    async fn get_completed_assignments(&self, external_id: &str) -> AppResult<Vec<Assignment>>;
}
