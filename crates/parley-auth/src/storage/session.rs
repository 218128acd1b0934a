//! Browser session storage.
//!
//! The end-user's browser session is an opaque key-value store identified
//! by a session id that travels in a signed cookie. [`SessionStore`] is the
//! collaborator interface; [`BrowserSession`] is the typed view the
//! endpoints use (logged-in user, staged authorization request).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::pending::PendingAuthorization;

const USER_ID_KEY: &str = "user_id";
const PENDING_KEY: &str = "oauth2_pending";

/// Key-value store with per-key TTL, partitioned by browser session id.
///
/// Values past their TTL must behave as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, session_id: &str, key: &str) -> AuthResult<Option<String>>;

    /// Write a value that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn set(&self, session_id: &str, key: &str, value: String, ttl: Duration)
    -> AuthResult<()>;

    /// Atomically read and remove a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take(&self, session_id: &str, key: &str) -> AuthResult<Option<String>>;

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn remove(&self, session_id: &str, key: &str) -> AuthResult<()>;

    /// Remove every value of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn destroy(&self, session_id: &str) -> AuthResult<()>;
}

/// Typed view of one browser session.
#[derive(Clone)]
pub struct BrowserSession {
    store: Arc<dyn SessionStore>,
    id: String,
    ttl: Duration,
}

impl BrowserSession {
    /// Binds a session id to a store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, id: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            id: id.into(),
            ttl,
        }
    }

    /// The session id carried by the cookie.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn user_id(&self) -> AuthResult<Option<String>> {
        self.store.get(&self.id, USER_ID_KEY).await
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn set_user_id(&self, user_id: &str) -> AuthResult<()> {
        self.store
            .set(&self.id, USER_ID_KEY, user_id.to_string(), self.ttl)
            .await
    }

    /// Stages an authorization request, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage operation fails.
    pub async fn stage(&self, pending: &PendingAuthorization) -> AuthResult<()> {
        let value = serde_json::to_string(pending)?;
        self.store.set(&self.id, PENDING_KEY, value, self.ttl).await
    }

    /// Removes and returns the staged authorization request.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization or the storage operation fails.
    pub async fn take_pending(&self) -> AuthResult<Option<PendingAuthorization>> {
        match self.store.take(&self.id, PENDING_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn destroy(&self) -> AuthResult<()> {
        self.store.destroy(&self.id).await
    }
}
