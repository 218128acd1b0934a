//! Token storage trait.
//!
//! A token row is indexed by its id, its access token value and (when
//! refresh is enabled) its refresh token value.
//!
//! # Implementation Notes
//!
//! - Access and refresh values must be unique across all rows, in both
//!   columns; `create` rejects collisions instead of overwriting
//! - [`TokenStorage::take_by_refresh`] must be atomic with respect to every
//!   other mutation of the same row, so at most one rotation succeeds

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Token;

/// Storage operations for access/refresh token pairs.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Persist a new token row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the access or refresh value is
    /// already in use, or an error if the storage operation fails.
    async fn create(&self, token: &Token) -> AuthResult<()>;

    /// Find a row by access token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_access(&self, access_token: &str) -> AuthResult<Option<Token>>;

    /// Find a refresh-enabled row by refresh token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_refresh(&self, refresh_token: &str) -> AuthResult<Option<Token>>;

    /// List every row issued on behalf of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<Token>>;

    /// Atomically find and delete a refresh-enabled row by refresh value.
    ///
    /// Returns `Some` only to the caller whose delete removed the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take_by_refresh(&self, refresh_token: &str) -> AuthResult<Option<Token>>;

    /// Delete the row with this access token. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_access(&self, access_token: &str) -> AuthResult<bool>;

    /// Delete the row with this refresh token. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_refresh(&self, refresh_token: &str) -> AuthResult<bool>;

    /// Delete a row by id. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_id(&self, id: &str) -> AuthResult<bool>;
}
