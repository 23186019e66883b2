//! # nudgehub-engine
//!
//! The scheduled nudge-processing engine. This crate provides:
//! - A generic self-rescheduling daily timer with cooperative cancellation
//! - One criteria evaluator per nudge type, behind a registry
//! - The per-cycle orchestrator (load → evaluate → dedup-check → send → record)
//! - Retention jobs for cycle run records
//! - The engine facade handling configuration-driven rescheduling
//!
//! The engine consumes storage, user-source, provider, and gateway
//! collaborators through the traits in `nudgehub-core` only.

pub mod cycle;
pub mod engine;
pub mod evaluator;
pub mod fingerprint;
pub mod retention;
pub mod timer;

pub use cycle::{CycleSettings, CycleStats, NudgeCycleRunner};
pub use engine::NudgeEngine;
pub use retention::RetentionJobs;
pub use evaluator::{EvaluatorRegistry, NudgeEvaluator, Qualification};
pub use timer::DailyTimer;
