//! Nudge rule, configuration, ledger, and run-record entities.

pub mod config;
pub mod model;
pub mod process;
pub mod sent;

pub use config::NudgeConfig;
pub use model::{CreateNudge, Nudge};
pub use process::{NudgeProcess, ProcessStatus};
pub use sent::{NewSentNudge, NudgeMode, SentNudge};
