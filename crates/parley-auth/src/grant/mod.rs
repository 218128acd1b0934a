//! Token endpoint grant handlers.
//!
//! Each grant takes the parsed [`TokenRequest`] and the client credentials
//! found on the request, and either yields a [`TokenResponse`] or a
//! [`TokenError`] ready to be sent back.
//!
//! - [`authorization_code`] - Exchange a code (with optional PKCE)
//! - [`password`] - Resource owner password credentials
//! - [`client_credentials`] - Confidential clients acting for themselves
//! - [`refresh_token`] - Rotate a refresh-enabled token

pub mod authorization_code;
pub mod client_credentials;
pub mod password;
pub mod refresh_token;

use std::sync::Arc;

use tracing::debug;

use crate::oauth::client_auth::ClientCredentials;
use crate::oauth::error::TokenError;
use crate::oauth::token::{TokenRequest, TokenResponse, non_empty};
use crate::scope::ScopeSet;
use crate::storage::{AuthorizationCodeStorage, ClientStorage, UserDirectory};
use crate::token::TokenService;
use crate::types::GrantType;

/// Collaborators shared by the grant handlers.
#[derive(Clone)]
pub struct GrantContext {
    /// Registered clients.
    pub clients: Arc<dyn ClientStorage>,
    /// Outstanding authorization codes.
    pub codes: Arc<dyn AuthorizationCodeStorage>,
    /// End-user directory (password grant).
    pub users: Arc<dyn UserDirectory>,
    /// Token minting.
    pub tokens: Arc<TokenService>,
}

impl GrantContext {
    /// Dispatches the request to the handler for its `grant_type`.
    ///
    /// # Errors
    ///
    /// Returns `unsupported_grant_type` for unknown or missing grant types,
    /// otherwise whatever the grant handler reports.
    pub async fn handle(
        &self,
        request: &TokenRequest,
        credentials: Option<&ClientCredentials>,
    ) -> Result<TokenResponse, TokenError> {
        let Some(grant_type) = GrantType::parse(&request.grant_type) else {
            debug!(grant_type = %request.grant_type, "Unsupported grant type");
            return Err(TokenError::unsupported_grant_type());
        };

        match grant_type {
            GrantType::AuthorizationCode => {
                authorization_code::exchange(self, request, credentials).await
            }
            GrantType::Password => password::exchange(self, request, credentials).await,
            GrantType::ClientCredentials => {
                client_credentials::exchange(self, request, credentials).await
            }
            GrantType::RefreshToken => refresh_token::exchange(self, request, credentials).await,
        }
    }
}

/// Narrows the requested `scope` to `allowed`.
///
/// Without a requested scope the full `allowed` set is granted.
///
/// # Errors
///
/// Returns `invalid_scope` if a scope was requested and nothing of it is
/// allowed.
pub(crate) fn negotiate_scopes(
    requested: Option<&String>,
    allowed: &ScopeSet,
) -> Result<ScopeSet, TokenError> {
    let Some(raw) = non_empty(requested).filter(|raw| !raw.trim().is_empty()) else {
        return Ok(allowed.clone());
    };

    let granted = ScopeSet::parse(raw).intersect(allowed);
    if granted.is_empty() {
        debug!(requested = raw, "No requested scope is allowed");
        return Err(TokenError::invalid_scope());
    }
    Ok(granted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::oauth::error::ErrorCode;

    #[test]
    fn test_negotiate_without_request_grants_all() {
        let allowed = ScopeSet::parse("read write");
        assert_eq!(negotiate_scopes(None, &allowed).unwrap(), allowed);
        assert_eq!(negotiate_scopes(Some(&"  ".to_string()), &allowed).unwrap(), allowed);
    }

    #[test]
    fn test_negotiate_narrows() {
        let allowed = ScopeSet::parse("read write");
        let granted = negotiate_scopes(Some(&"read manage_bot".to_string()), &allowed).unwrap();
        assert_eq!(granted, ScopeSet::parse("read"));
    }

    #[test]
    fn test_negotiate_disjoint_is_invalid_scope() {
        let allowed = ScopeSet::parse("read");
        let err = negotiate_scopes(Some(&"manage_bot bogus".to_string()), &allowed).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, ErrorCode::InvalidScope);
    }
}
