//! Cycle run-record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::ProcessStore;
use nudgehub_entity::nudge::process::{NudgeProcess, ProcessStatus};

/// Repository for cycle run records.
#[derive(Debug, Clone)]
pub struct NudgeProcessRepository {
    pool: PgPool,
}

impl NudgeProcessRepository {
    /// Create a new run-record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessStore for NudgeProcessRepository {
    async fn insert_running(&self, started_at: DateTime<Utc>) -> AppResult<NudgeProcess> {
        sqlx::query_as::<_, NudgeProcess>(
            "INSERT INTO nudge_processes (started_at, status) VALUES ($1, $2) RETURNING *",
        )
        .bind(started_at)
        .bind(ProcessStatus::Running)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert run record", e))
    }

    async fn mark_succeeded(&self, id: Uuid, completed_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE nudge_processes SET status = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(ProcessStatus::Succeeded)
            .bind(completed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark run succeeded", e)
            })?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE nudge_processes SET status = $2, completed_at = $3, error_message = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ProcessStatus::Failed)
        .bind(completed_at)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark run failed", e))?;
        Ok(())
    }

    async fn find_recent(&self, limit: i64) -> AppResult<Vec<NudgeProcess>> {
        sqlx::query_as::<_, NudgeProcess>(
            "SELECT * FROM nudge_processes ORDER BY started_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list run records", e))
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM nudge_processes WHERE started_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune run records", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn fail_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE nudge_processes SET status = $1, completed_at = NOW(), \
             error_message = 'Marked failed by stale-run reaper' \
             WHERE status = $2 AND started_at < $3",
        )
        .bind(ProcessStatus::Failed)
        .bind(ProcessStatus::Running)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reap stale runs", e)
        })?;
        Ok(result.rows_affected())
    }
}
