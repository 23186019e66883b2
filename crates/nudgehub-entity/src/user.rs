//! End-user value object supplied by the Groups service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user in a nudge audience.
///
/// Fetched fresh from the user source every cycle; never cached by the
/// engine. The external identifier keys all learning-provider lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndUser {
    /// Internal user identifier.
    pub id: Uuid,
    /// External (SIS/LMS) identifier.
    pub external_id: String,
}
