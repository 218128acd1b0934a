//! User directory trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::User;

/// Read access to the user directory.
///
/// Password storage and hashing are the directory's business; the
/// authorization server only asks yes/no questions.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<User>>;

    /// Find a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>>;

    /// Check a plaintext password against the user's stored credential.
    ///
    /// Returns `Ok(false)` for a wrong password or a user without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage or hashing operation fails.
    async fn verify_password(&self, user: &User, password: &str) -> AuthResult<bool>;
}
