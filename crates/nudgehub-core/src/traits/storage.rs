//! Storage contracts for nudge definitions, configuration, the sent-nudge
//! ledger, and run records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use nudgehub_entity::nudge::config::NudgeConfig;
use nudgehub_entity::nudge::model::{CreateNudge, Nudge};
use nudgehub_entity::nudge::process::NudgeProcess;
use nudgehub_entity::nudge::sent::{NewSentNudge, NudgeMode};

use crate::result::AppResult;

/// Storage for nudge rule definitions.
#[async_trait]
pub trait NudgeStore: Send + Sync + std::fmt::Debug {
    /// List all nudges, active or not.
    async fn find_all(&self) -> AppResult<Vec<Nudge>>;

    /// List only active nudges (the population a cycle processes).
    async fn find_active(&self) -> AppResult<Vec<Nudge>>;

    /// Find a nudge by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Nudge>>;

    /// Create a nudge.
    async fn insert(&self, nudge: &CreateNudge) -> AppResult<Nudge>;

    /// Update a nudge in place.
    async fn update(&self, nudge: &Nudge) -> AppResult<()>;

    /// Delete a nudge. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Storage for the singleton engine configuration row.
#[async_trait]
pub trait NudgeConfigStore: Send + Sync + std::fmt::Debug {
    /// Fetch the configuration, if one has been saved.
    async fn find(&self) -> AppResult<Option<NudgeConfig>>;

    /// Upsert the configuration.
    async fn save(&self, config: &NudgeConfig) -> AppResult<()>;
}

/// The deduplication ledger: persisted (nudge, user, fingerprint) tuples
/// already notified.
///
/// Existence of a matching tuple is the sole idempotence signal. Callers
/// must check immediately before sending and record immediately after a
/// successful send. A failed `exists` read is treated as "do not send"
/// by the engine (fail-closed).
#[async_trait]
pub trait SentNudgeStore: Send + Sync + std::fmt::Debug {
    /// Check whether a matching ledger entry already exists.
    async fn exists(
        &self,
        nudge_id: Uuid,
        user_id: Uuid,
        fingerprint: u32,
        mode: NudgeMode,
    ) -> AppResult<bool>;

    /// Record a sent nudge. The same (nudge, user, fingerprint, mode)
    /// key is never written twice.
    async fn record(&self, entry: &NewSentNudge) -> AppResult<()>;
}

/// Storage for per-cycle run records (observability only).
#[async_trait]
pub trait ProcessStore: Send + Sync + std::fmt::Debug {
    /// Insert a run record in the `running` state.
    async fn insert_running(&self, started_at: DateTime<Utc>) -> AppResult<NudgeProcess>;

    /// Mark a run as succeeded.
    async fn mark_succeeded(&self, id: Uuid, completed_at: DateTime<Utc>) -> AppResult<()>;

    /// Mark a run as failed with an error message.
    async fn mark_failed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<()>;

    /// List the most recent runs for admin inspection.
    async fn find_recent(&self, limit: i64) -> AppResult<Vec<NudgeProcess>>;

    /// Delete run records started before the cutoff. Returns rows removed.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Mark `running` records started before the cutoff as failed.
    /// Returns rows updated.
    async fn fail_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
