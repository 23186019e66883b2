//! User-population contract (Groups-like).

use async_trait::async_trait;

use nudgehub_entity::user::EndUser;

use crate::result::AppResult;

/// Resolves a named population group to its member users.
#[async_trait]
pub trait UserSource: Send + Sync + std::fmt::Debug {
    /// Fetch the members of a group.
    async fn get_users(&self, group: &str) -> AppResult<Vec<EndUser>>;
}
