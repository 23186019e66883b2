//! # nudgehub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all NudgeHub entities.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
