//! Token revocation endpoint handler.
//!
//! # Request Format
//!
//! ```text
//! POST /oauth2/revoke
//! Content-Type: application/x-www-form-urlencoded
//!
//! token=<access or refresh token>
//! ```
//!
//! # Response
//!
//! Always `200 OK` with an empty body, whether or not the token existed,
//! so the endpoint cannot be used to probe for valid tokens.

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::AuthState;

/// Form parameters for the revocation endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RevocationForm {
    /// The access or refresh token to revoke.
    pub token: String,
}

/// `POST /oauth2/revoke`
pub async fn revoke_handler(
    State(state): State<AuthState>,
    form: Result<Form<RevocationForm>, FormRejection>,
) -> StatusCode {
    let token = match form {
        Ok(Form(form)) => form.token,
        Err(rejection) => {
            debug!(error = %rejection, "Ignoring malformed revocation request");
            return StatusCode::OK;
        }
    };

    if token.is_empty() {
        return StatusCode::OK;
    }

    let revoked = async {
        let by_access = state.tokens.delete_by_access(&token).await?;
        let by_refresh = state.tokens.delete_by_refresh(&token).await?;
        crate::AuthResult::Ok(by_access || by_refresh)
    };

    match revoked.await {
        Ok(true) => info!("Token revoked"),
        Ok(false) => debug!("Revocation of an unknown token"),
        Err(e) => error!(error = %e, "Token revocation failed"),
    }

    StatusCode::OK
}
