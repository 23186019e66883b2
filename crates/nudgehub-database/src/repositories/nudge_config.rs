//! Engine configuration repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use nudgehub_core::error::{AppError, ErrorKind};
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::NudgeConfigStore;
use nudgehub_entity::nudge::config::NudgeConfig;

/// Repository for the singleton engine configuration row.
#[derive(Debug, Clone)]
pub struct NudgeConfigRepository {
    pool: PgPool,
}

impl NudgeConfigRepository {
    /// Create a new configuration repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NudgeConfigStore for NudgeConfigRepository {
    async fn find(&self) -> AppResult<Option<NudgeConfig>> {
        sqlx::query_as::<_, NudgeConfig>("SELECT * FROM nudge_config WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load nudge config", e)
            })
    }

    async fn save(&self, config: &NudgeConfig) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO nudge_config (id, enabled, production_group, test_group, test_mode, \
             process_time, block_size, updated_at) \
             VALUES (1, $1, $2, $3, $4, $5, $6, NOW()) \
             ON CONFLICT (id) DO UPDATE SET enabled = $1, production_group = $2, \
             test_group = $3, test_mode = $4, process_time = $5, block_size = $6, \
             updated_at = NOW()",
        )
        .bind(config.enabled)
        .bind(&config.production_group)
        .bind(&config.test_group)
        .bind(config.test_mode)
        .bind(&config.process_time)
        .bind(config.block_size)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save nudge config", e))?;
        Ok(())
    }
}
