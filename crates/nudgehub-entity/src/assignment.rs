//! Assignment value object supplied by the learning provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An assignment as reported by the learning provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Provider-side assignment identifier.
    pub id: String,
    /// Assignment display name.
    pub name: String,
    /// When the assignment was or is due.
    pub due_at: DateTime<Utc>,
}
