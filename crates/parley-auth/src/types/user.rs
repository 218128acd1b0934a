//! End-users as seen by the authorization server.

use serde::{Deserialize, Serialize};

/// A user known to the user directory.
///
/// Credentials are not part of this type; they stay inside the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: String,
    /// Unique login name.
    pub name: String,
}
