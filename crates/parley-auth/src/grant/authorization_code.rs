//! `authorization_code` grant.
//!
//! The code is removed from storage before anything else is checked, so a
//! code can be presented at most once regardless of whether the exchange
//! succeeds.

use axum::http::StatusCode;
use tracing::{debug, info};

use super::GrantContext;
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::error::{ErrorCode, TokenError};
use crate::oauth::token::{TokenRequest, TokenResponse, non_empty};

/// Exchanges an authorization code for a token.
///
/// # Errors
///
/// - `400 invalid_request`: no code, or PKCE verification failed
/// - `400 invalid_grant`: unknown, already used, or expired code
/// - `401 invalid_client`: the code belongs to another client
/// - `401 invalid_grant`: `redirect_uri` differs from the authorization request
pub async fn exchange(
    ctx: &GrantContext,
    request: &TokenRequest,
    credentials: Option<&ClientCredentials>,
) -> Result<TokenResponse, TokenError> {
    let Some(code_value) = non_empty(request.code.as_ref()) else {
        return Err(TokenError::invalid_request().with_description("code is required"));
    };

    let Some(code) = ctx.codes.take(code_value).await? else {
        debug!("Authorization code unknown or already used");
        return Err(TokenError::invalid_grant());
    };

    let client = authenticate_client(ctx.clients.as_ref(), credentials).await?;
    if code.client_id != client.id {
        debug!(client_id = %client.id, "Authorization code was issued to another client");
        return Err(TokenError::client_auth_failed());
    }

    if code.is_expired() {
        debug!(client_id = %client.id, "Authorization code expired");
        return Err(TokenError::invalid_grant().with_description("code expired"));
    }

    let redirect_uri = request.redirect_uri.as_deref().unwrap_or_default();
    if redirect_uri != code.redirect_uri {
        debug!(client_id = %client.id, "redirect_uri does not match the authorization request");
        return Err(TokenError::new(StatusCode::UNAUTHORIZED, ErrorCode::InvalidGrant));
    }

    let verifier = non_empty(request.code_verifier.as_ref());
    match (&code.code_challenge, verifier) {
        (Some(challenge), Some(verifier)) if challenge.verify(verifier) => {}
        (Some(_), _) => {
            debug!(client_id = %client.id, "PKCE verification failed");
            return Err(TokenError::invalid_request().with_description("invalid code_verifier"));
        }
        (None, Some(_)) => {
            return Err(TokenError::invalid_request()
                .with_description("code_verifier sent without a code_challenge"));
        }
        (None, None) => {}
    }

    let token = ctx
        .tokens
        .issue(&client, Some(&code.user_id), code.scopes.clone(), true)
        .await?;

    info!(
        client_id = %client.id,
        user_id = %code.user_id,
        scopes = %token.scopes,
        "Authorization code exchanged"
    );

    Ok(TokenResponse::from_token(&token).with_scope_if(code.scope_was_narrowed(), &token.scopes))
}
