//! `refresh_token` grant.
//!
//! Refresh tokens rotate: the presented row is removed atomically and a
//! new row is issued for the same user and client. A second presentation
//! of the same refresh token finds nothing.

use tracing::{debug, info};

use super::{GrantContext, negotiate_scopes};
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::error::TokenError;
use crate::oauth::token::{TokenRequest, TokenResponse, non_empty};

/// Rotates a refresh-enabled token.
///
/// # Errors
///
/// - `400 invalid_request`: no refresh token
/// - `400 invalid_grant`: unknown or already used refresh token
/// - `400 invalid_client`: the token's client no longer exists
/// - `401 invalid_client`: the presenting client is not the token's client
/// - `400 invalid_scope`: the requested scopes exceed the old token's
pub async fn exchange(
    ctx: &GrantContext,
    request: &TokenRequest,
    credentials: Option<&ClientCredentials>,
) -> Result<TokenResponse, TokenError> {
    let Some(refresh_value) = non_empty(request.refresh_token.as_ref()) else {
        return Err(TokenError::invalid_request().with_description("refresh_token is required"));
    };

    let Some(old) = ctx.tokens.storage().take_by_refresh(refresh_value).await? else {
        debug!("Refresh token unknown or already used");
        return Err(TokenError::invalid_grant());
    };

    if ctx.clients.find_by_client_id(&old.client_id).await?.is_none() {
        debug!(client_id = %old.client_id, "Refresh token belongs to a deleted client");
        return Err(TokenError::unknown_client());
    }

    let client = authenticate_client(ctx.clients.as_ref(), credentials).await?;
    if client.id != old.client_id {
        debug!(client_id = %client.id, "Refresh token was issued to another client");
        return Err(TokenError::client_auth_failed());
    }

    let scopes = negotiate_scopes(request.scope.as_ref(), &old.scopes)?;
    let narrowed = scopes != old.scopes;

    let token = ctx
        .tokens
        .issue(&client, old.user_id.as_deref(), scopes, true)
        .await?;

    info!(
        client_id = %client.id,
        user_id = ?token.user_id,
        "Refresh token rotated"
    );

    Ok(TokenResponse::from_token(&token).with_scope_if(narrowed, &token.scopes))
}
