//! # nudgehub-clients
//!
//! HTTP adapters for the partner services NudgeHub consumes: the Canvas
//! learning provider, the Groups user source, and the notification
//! gateway. Each adapter implements the corresponding collaborator trait
//! from `nudgehub-core`.

pub mod activity;
pub mod canvas;
pub mod groups;
pub mod notify;

pub use canvas::CanvasClient;
pub use groups::GroupsClient;
pub use notify::NotifyClient;
