//! In-memory storage backend for the Parley authorization server.
//!
//! Implements every storage trait from `parley_auth::storage`. Single-key
//! tables use `dashmap`; the token table keeps three indexes behind one
//! `tokio::sync::RwLock` so rotation and revocation update them together.
//!
//! # Example
//!
//! ```ignore
//! use parley_auth_memory::MemoryStores;
//!
//! let stores = MemoryStores::new();
//! stores.users.add_user("alice", "correct horse")?;
//! let state = AuthState::new(stores.backends(), config, key, issuer);
//! ```

pub mod client;
pub mod code;
pub mod password;
pub mod session;
pub mod token;
pub mod user;

use std::sync::Arc;

use parley_auth::http::AuthBackends;

pub use client::MemoryClientStorage;
pub use code::MemoryCodeStorage;
pub use session::MemorySessionStore;
pub use token::MemoryTokenStorage;
pub use user::MemoryUserDirectory;

/// Every in-memory store, shareable.
#[derive(Clone, Default)]
pub struct MemoryStores {
    /// Clients.
    pub clients: Arc<MemoryClientStorage>,
    /// Authorization codes.
    pub codes: Arc<MemoryCodeStorage>,
    /// Tokens.
    pub tokens: Arc<MemoryTokenStorage>,
    /// Users.
    pub users: Arc<MemoryUserDirectory>,
    /// Browser sessions.
    pub sessions: Arc<MemorySessionStore>,
}

impl MemoryStores {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stores as trait objects for `AuthState`.
    #[must_use]
    pub fn backends(&self) -> AuthBackends {
        AuthBackends {
            clients: self.clients.clone(),
            codes: self.codes.clone(),
            tokens: self.tokens.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
        }
    }
}
