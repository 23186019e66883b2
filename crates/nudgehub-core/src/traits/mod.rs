//! Collaborator contracts defined in `nudgehub-core` and implemented by
//! the database and client crates. The engine consumes these traits only,
//! never the concrete implementations.

pub mod gateway;
pub mod provider;
pub mod storage;
pub mod users;

pub use gateway::NotificationGateway;
pub use provider::LearningProvider;
pub use storage::{NudgeConfigStore, NudgeStore, ProcessStore, SentNudgeStore};
pub use users::UserSource;
