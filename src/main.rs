//! NudgeHub Server — LMS Companion Nudge Engine
//!
//! Main entry point that wires all crates together and starts the engine.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{fmt, EnvFilter};

use nudgehub_core::config::AppConfig;
use nudgehub_core::error::AppError;
use nudgehub_core::traits::{LearningProvider, NudgeConfigStore, ProcessStore};

use nudgehub_engine::evaluator::{
    CompletedAssignmentEarlyEvaluator, EvaluatorRegistry, LastLoginEvaluator,
    MissedAssignmentEvaluator,
};
use nudgehub_engine::{CycleSettings, NudgeCycleRunner, NudgeEngine, RetentionJobs};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("NUDGEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NudgeHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = nudgehub_database::connection::DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // ── Step 2: Initialize repositories ──────────────────────────
    let nudge_repo = Arc::new(nudgehub_database::repositories::nudge::NudgeRepository::new(
        db.pool().clone(),
    ));
    let config_repo: Arc<dyn NudgeConfigStore> = Arc::new(
        nudgehub_database::repositories::nudge_config::NudgeConfigRepository::new(
            db.pool().clone(),
        ),
    );
    let ledger_repo = Arc::new(
        nudgehub_database::repositories::sent_nudge::SentNudgeRepository::new(db.pool().clone()),
    );
    let process_repo: Arc<dyn ProcessStore> = Arc::new(
        nudgehub_database::repositories::process::NudgeProcessRepository::new(db.pool().clone()),
    );

    // ── Step 3: Initialize partner service clients ───────────────
    tracing::info!("Initializing partner service clients...");
    let provider: Arc<dyn LearningProvider> =
        Arc::new(nudgehub_clients::canvas::CanvasClient::new(&config.canvas)?);
    let user_source = Arc::new(nudgehub_clients::groups::GroupsClient::new(&config.groups)?);
    let gateway = Arc::new(nudgehub_clients::notify::NotifyClient::new(
        &config.notifications,
    )?);
    tracing::info!("Partner service clients initialized");

    // ── Step 4: Register criteria evaluators ─────────────────────
    let threshold = config.engine.default_threshold_hours;
    let mut registry = EvaluatorRegistry::new();
    registry.register(Arc::new(LastLoginEvaluator::new(
        Arc::clone(&provider),
        threshold,
    )));
    registry.register(Arc::new(MissedAssignmentEvaluator::new(
        Arc::clone(&provider),
        threshold,
    )));
    registry.register(Arc::new(CompletedAssignmentEarlyEvaluator::new(
        Arc::clone(&provider),
    )));
    tracing::info!("Supported nudge types: {:?}", registry.registered_types());

    // ── Step 5: Build the engine ─────────────────────────────────
    let cycle_runner = Arc::new(NudgeCycleRunner::new(
        nudge_repo,
        Arc::clone(&config_repo),
        ledger_repo,
        Arc::clone(&process_repo),
        user_source,
        gateway,
        registry,
        CycleSettings {
            subject: config.notifications.subject.clone(),
            default_block_size: config.engine.default_block_size,
        },
    ));
    let retention = Arc::new(RetentionJobs::new(
        Arc::clone(&process_repo),
        config.engine.history_retention_days,
        config.engine.stale_running_hours,
    ));
    let engine = NudgeEngine::new(cycle_runner, retention, config_repo, config.engine.clone());

    // ── Step 6: Start timers ─────────────────────────────────────
    engine.start().await?;
    tracing::info!("NudgeHub engine started");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping timers...");
    engine.shutdown().await;

    tracing::info!("NudgeHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
