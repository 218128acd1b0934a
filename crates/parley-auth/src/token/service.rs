//! Token minting.
//!
//! The [`TokenService`] draws fresh access/refresh values, persists the row
//! and retries when the store reports a collision.
//!
//! # Usage
//!
//! ```ignore
//! use parley_auth::token::{TokenConfig, TokenService};
//!
//! let service = TokenService::new(token_storage, TokenConfig::default());
//! let token = service.issue(&client, Some(&user_id), scopes, true).await?;
//! ```

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::generate_secret;
use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::scope::ScopeSet;
use crate::storage::TokenStorage;
use crate::types::{Client, Token};

/// How many times a colliding value is redrawn before giving up.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime.
    pub access_token_lifetime: Duration,

    /// Whether grants that support refresh actually issue refresh tokens.
    pub issue_refresh_tokens: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::hours(1),
            issue_refresh_tokens: true,
        }
    }
}

impl From<&OAuthConfig> for TokenConfig {
    fn from(config: &OAuthConfig) -> Self {
        Self {
            access_token_lifetime: config.access_lifetime(),
            issue_refresh_tokens: config.issue_refresh_tokens,
        }
    }
}

/// Mints and persists token rows.
pub struct TokenService {
    storage: Arc<dyn TokenStorage>,
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>, config: TokenConfig) -> Self {
        Self { storage, config }
    }

    /// The underlying token storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Issues a token for `client`.
    ///
    /// `refresh` asks for a refresh token; one is only issued if refresh
    /// tokens are enabled in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails, or if fresh values
    /// keep colliding with existing rows.
    pub async fn issue(
        &self,
        client: &Client,
        user_id: Option<&str>,
        scopes: ScopeSet,
        refresh: bool,
    ) -> AuthResult<Token> {
        let with_refresh = refresh && self.config.issue_refresh_tokens;

        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = Token {
                id: Uuid::new_v4().to_string(),
                client_id: client.id.clone(),
                user_id: user_id.map(str::to_string),
                access_token: generate_secret(),
                refresh_token: with_refresh.then(generate_secret),
                redirect_uri: client.redirect_uri.clone().unwrap_or_default(),
                scopes: scopes.clone(),
                created_at: OffsetDateTime::now_utc(),
                expires_in: self.config.access_token_lifetime.whole_seconds(),
            };

            match self.storage.create(&token).await {
                Ok(()) => {
                    debug!(
                        client_id = %client.id,
                        user_id = ?user_id,
                        refresh = with_refresh,
                        "Token issued"
                    );
                    return Ok(token);
                }
                Err(e) if e.is_conflict() => {
                    warn!(attempt, "Generated token collided with an existing row");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AuthError::internal("could not generate a unique token"))
    }
}
