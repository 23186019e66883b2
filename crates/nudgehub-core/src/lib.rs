//! # nudgehub-core
//!
//! Core crate for NudgeHub. Contains configuration schemas, the unified
//! error system, and the collaborator traits the nudge engine consumes
//! (storage, user source, learning provider, notification gateway).

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
