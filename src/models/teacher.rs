//! Teacher directory record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A teacher allowed to manage announcements. `username` is the credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Teacher {
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
