//! Concrete repository implementations of the core storage traits.

pub mod nudge;
pub mod nudge_config;
pub mod process;
pub mod sent_nudge;

pub use nudge::NudgeRepository;
pub use nudge_config::NudgeConfigRepository;
pub use process::NudgeProcessRepository;
pub use sent_nudge::SentNudgeRepository;
