//! `client_credentials` grant.

use tracing::{debug, info};

use super::{GrantContext, negotiate_scopes};
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::error::TokenError;
use crate::oauth::token::{TokenRequest, TokenResponse};

/// Issues a token to a confidential client acting on its own behalf.
///
/// The token has no user and never carries a refresh token.
///
/// # Errors
///
/// - `401 unauthorized_client`: the client is public
/// - `400 invalid_scope`: nothing requested is allowed for the client
pub async fn exchange(
    ctx: &GrantContext,
    request: &TokenRequest,
    credentials: Option<&ClientCredentials>,
) -> Result<TokenResponse, TokenError> {
    let client = authenticate_client(ctx.clients.as_ref(), credentials).await?;

    if !client.confidential {
        debug!(client_id = %client.id, "Public client attempted client_credentials");
        return Err(TokenError::unauthorized_client());
    }

    let scopes = negotiate_scopes(request.scope.as_ref(), &client.scopes)?;
    let narrowed = scopes != client.scopes;

    let token = ctx.tokens.issue(&client, None, scopes, false).await?;

    info!(client_id = %client.id, scopes = %token.scopes, "Client credentials grant issued token");

    Ok(TokenResponse::from_token(&token).with_scope_if(narrowed, &token.scopes))
}
