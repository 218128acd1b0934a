//! Authorization code storage trait.
//!
//! # Implementation Notes
//!
//! - Never log code values
//! - [`AuthorizationCodeStorage::take`] must be atomic: of any number of
//!   concurrent callers presenting the same code, exactly one receives it

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage operations for single-use authorization codes.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Persist a freshly minted code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the code value already exists, or an
    /// error if the storage operation fails.
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Look up a code without consuming it.
    ///
    /// Returns codes regardless of expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically look up and delete a code.
    ///
    /// Returns `Some` only to the caller whose delete removed the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Delete a code. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, code: &str) -> AuthResult<bool>;

    /// Delete every expired code. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
