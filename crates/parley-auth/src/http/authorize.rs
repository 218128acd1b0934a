//! Authorization endpoint handlers.
//!
//! `GET /oauth2/authorize` reads the request from the query string,
//! `POST /oauth2/authorize` from a form body. Both run the same logic.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::SignedCookieJar;
use tracing::{debug, error};

use super::{AuthState, respond};
use crate::oauth::authorize::AuthorizationRequest;

/// `GET /oauth2/authorize`
pub async fn authorize_get(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    Query(request): Query<AuthorizationRequest>,
) -> Response {
    authorize(state, jar, request).await
}

/// `POST /oauth2/authorize`
pub async fn authorize_post(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    Form(request): Form<AuthorizationRequest>,
) -> Response {
    authorize(state, jar, request).await
}

async fn authorize(state: AuthState, jar: SignedCookieJar, request: AuthorizationRequest) -> Response {
    debug!(
        client_id = %request.client_id,
        response_type = %request.response_type,
        prompt = %request.prompt,
        "Processing authorization request"
    );

    let user_id = match state.current_user(&jar).await {
        Ok(user_id) => user_id,
        Err(e) => {
            error!(error = %e, "Failed to read browser session");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let outcome = state
        .authorization
        .authorize(&request, user_id.as_deref())
        .await;

    respond(&state, jar, outcome).await
}
