//! Sent-nudge ledger repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::SentNudgeStore;
use nudgehub_entity::nudge::sent::{NewSentNudge, NudgeMode};

/// Repository for the sent-nudge deduplication ledger.
///
/// Fingerprints are widened from `u32` to `BIGINT` at this boundary.
/// The unique index on (nudge_id, user_id, fingerprint, mode) backs the
/// at-most-once invariant even if a race slips past the `exists` check.
#[derive(Debug, Clone)]
pub struct SentNudgeRepository {
    pool: PgPool,
}

impl SentNudgeRepository {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentNudgeStore for SentNudgeRepository {
    async fn exists(
        &self,
        nudge_id: Uuid,
        user_id: Uuid,
        fingerprint: u32,
        mode: NudgeMode,
    ) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1::BIGINT FROM sent_nudges \
             WHERE nudge_id = $1 AND user_id = $2 AND fingerprint = $3 AND mode = $4",
        )
        .bind(nudge_id)
        .bind(user_id)
        .bind(fingerprint as i64)
        .bind(mode)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check sent-nudge ledger", e)
        })?;
        Ok(found.is_some())
    }

    async fn record(&self, entry: &NewSentNudge) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO sent_nudges (nudge_id, user_id, external_user_id, fingerprint, mode, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (nudge_id, user_id, fingerprint, mode) DO NOTHING",
        )
        .bind(entry.nudge_id)
        .bind(entry.user_id)
        .bind(&entry.external_user_id)
        .bind(entry.fingerprint as i64)
        .bind(entry.mode)
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record sent nudge", e)
        })?;

        if result.rows_affected() == 0 {
            // Already recorded; the ledger entry is immutable.
            return Err(AppError::conflict(format!(
                "Sent nudge already recorded: nudge={} user={} fingerprint={}",
                entry.nudge_id, entry.user_id, entry.fingerprint
            )));
        }
        Ok(())
    }
}
