//! Consent decision handler.
//!
//! The consent screen posts `submit=approve` or `submit=deny` here. The
//! staged request is removed from the session as it is read, so a
//! decision can be submitted once per staged request.

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::{debug, error};

use super::{AuthState, respond};
use crate::oauth::service::Decision;

/// Form posted by the consent screen.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DecideForm {
    /// `approve` or `deny`.
    pub submit: String,
}

/// `POST /oauth2/authorize/decide`
pub async fn decide_handler(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    form: Result<Form<DecideForm>, FormRejection>,
) -> Response {
    // An unreadable body is a decision without a `submit` value.
    let form = form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "Unreadable decision form");
        DecideForm::default()
    });
    let session = state.current_session(&jar);

    let user_id = match &session {
        Some(session) => match session.user_id().await {
            Ok(user_id) => user_id,
            Err(e) => {
                error!(error = %e, "Failed to read browser session");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
        None => None,
    };

    // Only consume the staged request once the decision can be acted on.
    let pending = match &session {
        Some(session) if user_id.is_some() && Decision::parse(&form.submit).is_some() => {
            match session.take_pending().await {
                Ok(pending) => pending,
                Err(e) => {
                    error!(error = %e, "Failed to read staged authorization request");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
        _ => None,
    };

    let outcome = state
        .authorization
        .decide(&form.submit, user_id.as_deref(), pending)
        .await;

    respond(&state, jar, outcome).await
}
