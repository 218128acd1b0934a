//! `password` grant (resource owner password credentials).

use axum::http::StatusCode;
use tracing::{debug, info};

use super::{GrantContext, negotiate_scopes};
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::error::{ErrorCode, TokenError};
use crate::oauth::token::{TokenRequest, TokenResponse, non_empty};

/// Issues a token for a user identified by name and password.
///
/// # Errors
///
/// - `400 invalid_request`: username or password missing
/// - `401 invalid_grant`: unknown user or wrong password
/// - `400 invalid_scope`: nothing requested is allowed for the client
pub async fn exchange(
    ctx: &GrantContext,
    request: &TokenRequest,
    credentials: Option<&ClientCredentials>,
) -> Result<TokenResponse, TokenError> {
    let client = authenticate_client(ctx.clients.as_ref(), credentials).await?;

    let (Some(username), Some(password)) = (
        non_empty(request.username.as_ref()),
        non_empty(request.password.as_ref()),
    ) else {
        return Err(TokenError::invalid_request().with_description("username and password are required"));
    };

    let user = ctx.users.find_by_name(username).await?;
    let verified = match &user {
        Some(user) => ctx.users.verify_password(user, password).await?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        debug!(client_id = %client.id, "Resource owner credentials rejected");
        return Err(TokenError::new(StatusCode::UNAUTHORIZED, ErrorCode::InvalidGrant));
    };

    let scopes = negotiate_scopes(request.scope.as_ref(), &client.scopes)?;
    let narrowed = scopes != client.scopes;

    let token = ctx.tokens.issue(&client, Some(&user.id), scopes, true).await?;

    info!(client_id = %client.id, user_id = %user.id, "Password grant issued token");

    Ok(TokenResponse::from_token(&token).with_scope_if(narrowed, &token.scopes))
}
