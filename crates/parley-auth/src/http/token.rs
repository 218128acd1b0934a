//! OAuth 2.0 token endpoint handler.
//!
//! # Example
//!
//! ```text
//! POST /oauth2/token
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <base64(client_id:client_secret)>
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! &code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//! ```

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use tracing::{debug, info, warn};

use super::AuthState;
use crate::oauth::client_auth::extract_credentials;
use crate::oauth::token::TokenRequest;

/// `POST /oauth2/token`
///
/// Client credentials are read from `Authorization: Basic` first, then
/// from the `client_id`/`client_secret` form fields.
pub async fn token_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    // An unreadable body carries no grant_type and is dispatched as such.
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable token request");
            TokenRequest::default()
        }
    };

    let credentials = extract_credentials(&headers, &request);

    debug!(
        grant_type = %request.grant_type,
        client_id = ?credentials.as_ref().map(|c| c.client_id.as_str()),
        "Processing token request"
    );

    match state.grants.handle(&request, credentials.as_ref()).await {
        Ok(response) => {
            info!(grant_type = %request.grant_type, "Token issued successfully");
            Json(response).into_response()
        }
        Err(e) => {
            warn!(
                grant_type = %request.grant_type,
                error = %e.body.error,
                status = %e.status,
                "Token request failed"
            );
            e.into_response()
        }
    }
}
