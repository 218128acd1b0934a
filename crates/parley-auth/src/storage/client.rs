//! Client storage trait.
//!
//! Defines the interface for OAuth client persistence operations.
//! Implementations are provided by storage backends (e.g. `parley-auth-memory`).

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for OAuth 2.0 clients.
///
/// The authorization flows only call [`ClientStorage::find_by_client_id`];
/// the remaining methods serve client management.
///
/// # Example
///
/// ```ignore
/// use parley_auth::storage::ClientStorage;
///
/// async fn example(storage: &dyn ClientStorage) -> parley_auth::AuthResult<()> {
///     if let Some(client) = storage.find_by_client_id("my-app").await? {
///         println!("Found client: {}", client.name);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Register a new client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the id is taken, or an error if the
    /// storage operation fails.
    async fn create(&self, client: &Client) -> AuthResult<Client>;

    /// List the clients registered by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_by_creator(&self, creator_id: &str) -> AuthResult<Vec<Client>>;

    /// Replace an existing client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the client doesn't exist, or an error
    /// if the storage operation fails.
    async fn update(&self, client: &Client) -> AuthResult<Client>;

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the client doesn't exist, or an error
    /// if the storage operation fails.
    async fn delete(&self, client_id: &str) -> AuthResult<()>;
}
