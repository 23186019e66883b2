//! Nudge repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::NudgeStore;
use nudgehub_entity::nudge::model::{CreateNudge, Nudge};

/// Repository for nudge rule CRUD operations.
#[derive(Debug, Clone)]
pub struct NudgeRepository {
    pool: PgPool,
}

impl NudgeRepository {
    /// Create a new nudge repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NudgeStore for NudgeRepository {
    async fn find_all(&self) -> AppResult<Vec<Nudge>> {
        sqlx::query_as::<_, Nudge>("SELECT * FROM nudges ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list nudges", e))
    }

    async fn find_active(&self) -> AppResult<Vec<Nudge>> {
        sqlx::query_as::<_, Nudge>("SELECT * FROM nudges WHERE active = TRUE ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list active nudges", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Nudge>> {
        sqlx::query_as::<_, Nudge>("SELECT * FROM nudges WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find nudge", e))
    }

    async fn insert(&self, nudge: &CreateNudge) -> AppResult<Nudge> {
        sqlx::query_as::<_, Nudge>(
            "INSERT INTO nudges (nudge_type, name, message, link, params, active, user_sources) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&nudge.nudge_type)
        .bind(&nudge.name)
        .bind(&nudge.message)
        .bind(&nudge.link)
        .bind(&nudge.params)
        .bind(nudge.active)
        .bind(&nudge.user_sources)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create nudge", e))
    }

    async fn update(&self, nudge: &Nudge) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE nudges SET nudge_type = $2, name = $3, message = $4, link = $5, \
             params = $6, active = $7, user_sources = $8, updated_at = $9 WHERE id = $1",
        )
        .bind(nudge.id)
        .bind(&nudge.nudge_type)
        .bind(&nudge.name)
        .bind(&nudge.message)
        .bind(&nudge.link)
        .bind(&nudge.params)
        .bind(nudge.active)
        .bind(&nudge.user_sources)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update nudge", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Nudge {} not found", nudge.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nudges WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete nudge", e))?;
        Ok(result.rows_affected() > 0)
    }
}
