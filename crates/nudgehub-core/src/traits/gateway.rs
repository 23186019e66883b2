//! Outbound notification gateway contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// Sends one outbound message through the external notification service.
///
/// A send failure never aborts the surrounding batch and never causes a
/// ledger write, so the same condition stays eligible for retry on the
/// next cycle.
#[async_trait]
pub trait NotificationGateway: Send + Sync + std::fmt::Debug {
    /// Send a message to the given recipients.
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> AppResult<()>;
}
