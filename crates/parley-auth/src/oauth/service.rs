//! Authorization and decision logic.
//!
//! The [`AuthorizationService`] validates authorization requests and
//! end-user decisions and says what the endpoint should do next. It never
//! touches HTTP or cookies; the handlers in [`crate::http`] translate an
//! [`AuthorizeOutcome`] into a response and perform session writes.
//!
//! # Usage
//!
//! ```ignore
//! use parley_auth::oauth::{AuthorizationService, AuthorizeOutcome};
//!
//! let service = AuthorizationService::new(clients, codes, users, consent, config);
//! match service.authorize(&request, user_id.as_deref()).await {
//!     AuthorizeOutcome::Redirect(location) => { /* 302 to the client */ }
//!     AuthorizeOutcome::Stage { pending, .. } => { /* save in session */ }
//!     _ => {}
//! }
//! ```

use std::sync::Arc;

use axum::http::StatusCode;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use super::authorize::{AuthorizationRequest, AuthorizationResponse};
use super::consent::ConsentEvaluator;
use super::error::{AuthorizationError, ErrorCode};
use super::pending::PendingAuthorization;
use super::pkce;
use super::response_type::ResponseType;
use crate::config::OAuthConfig;
use crate::scope::ScopeSet;
use crate::storage::{AuthorizationCodeStorage, ClientStorage, UserDirectory};
use crate::types::Client;

/// What the authorization or decide endpoint should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    /// Answer with a bare status; no safe redirect target is known.
    Reject(StatusCode),

    /// `302` to this location (the client's redirect URI with a code or an
    /// error, or the login page).
    Redirect(String),

    /// Save `pending` in the browser session, then `302` to `location`.
    /// If saving fails, `302` to `on_failure` instead.
    Stage {
        /// The validated request.
        pending: PendingAuthorization,
        /// Consent screen location.
        location: String,
        /// Client redirect carrying `error=server_error`.
        on_failure: String,
    },
}

/// The end-user's answer on the consent screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `submit=approve`
    Approve,
    /// `submit=deny`
    Deny,
}

impl Decision {
    /// Parses the `submit` form field.
    #[must_use]
    pub fn parse(submit: &str) -> Option<Self> {
        match submit {
            "approve" => Some(Self::Approve),
            "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

/// Validates authorization requests and end-user decisions.
pub struct AuthorizationService {
    clients: Arc<dyn ClientStorage>,
    codes: Arc<dyn AuthorizationCodeStorage>,
    users: Arc<dyn UserDirectory>,
    consent: ConsentEvaluator,
    config: OAuthConfig,
}

/// Resolved client plus the place to send the user agent.
struct RedirectTarget {
    client: Client,
    redirect_uri: String,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        codes: Arc<dyn AuthorizationCodeStorage>,
        users: Arc<dyn UserDirectory>,
        consent: ConsentEvaluator,
        config: OAuthConfig,
    ) -> Self {
        Self {
            clients,
            codes,
            users,
            consent,
            config,
        }
    }

    /// Processes an authorization request for the (optional) logged-in user.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        user_id: Option<&str>,
    ) -> AuthorizeOutcome {
        if request.client_id.is_empty() {
            return AuthorizeOutcome::Reject(StatusCode::BAD_REQUEST);
        }

        let target = match self.resolve_target(&request.client_id).await {
            Ok(target) => target,
            Err(status) => return AuthorizeOutcome::Reject(status),
        };

        if !request.redirect_uri.is_empty()
            && target.client.redirect_uri.as_deref() != Some(request.redirect_uri.as_str())
        {
            debug!(client_id = %target.client.id, "redirect_uri does not match registration");
            return AuthorizeOutcome::Reject(StatusCode::BAD_REQUEST);
        }

        let state = request.state.as_str();
        let fail = |code: ErrorCode| redirect_error(&target.redirect_uri, AuthorizationError::new(code, state));

        // Scope negotiation
        let (scopes, valid_scopes) = if request.scope.trim().is_empty() {
            (target.client.scopes.clone(), target.client.scopes.clone())
        } else {
            let requested = ScopeSet::parse(&request.scope);
            let valid = requested.intersect(&target.client.scopes);
            (requested, valid)
        };
        if valid_scopes.is_empty() {
            return fail(ErrorCode::InvalidScope);
        }

        let Ok(response_type) = ResponseType::parse(&request.response_type) else {
            return fail(ErrorCode::UnsupportedResponseType);
        };

        let code_challenge =
            match pkce::accept_challenge(&request.code_challenge, &request.code_challenge_method) {
                Ok(challenge) => challenge,
                Err(e) => {
                    debug!(client_id = %target.client.id, error = %e, "Rejected PKCE parameters");
                    return fail(ErrorCode::InvalidRequest);
                }
            };

        let pending = PendingAuthorization {
            response_type,
            client_id: target.client.id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scopes,
            valid_scopes,
            state: request.state.clone(),
            nonce: request.nonce.clone(),
            code_challenge,
            access_time: OffsetDateTime::now_utc(),
        };

        match request.prompt.as_str() {
            "none" => self.authorize_silently(&target, pending, user_id).await,
            "" => self.authorize_interactively(&target, pending, request, user_id),
            other => redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::InvalidRequest, state)
                    .with_description(format!("prompt {other} is not supported")),
            ),
        }
    }

    /// Processes the end-user's decision on a staged request.
    ///
    /// `submit` is the raw form value; `pending` has already been removed
    /// from the session by the caller.
    pub async fn decide(
        &self,
        submit: &str,
        user_id: Option<&str>,
        pending: Option<PendingAuthorization>,
    ) -> AuthorizeOutcome {
        let Some(decision) = Decision::parse(submit) else {
            return AuthorizeOutcome::Reject(StatusCode::BAD_REQUEST);
        };
        let Some(user_id) = user_id else {
            return AuthorizeOutcome::Reject(StatusCode::UNAUTHORIZED);
        };
        let Some(pending) = pending else {
            return AuthorizeOutcome::Reject(StatusCode::FORBIDDEN);
        };

        let target = match self.resolve_target(&pending.client_id).await {
            Ok(target) => target,
            Err(status) => return AuthorizeOutcome::Reject(status),
        };
        let state = pending.state.as_str();

        if pending.is_timed_out_at(OffsetDateTime::now_utc(), self.config.pending_timeout()) {
            info!(client_id = %pending.client_id, "Authorization decision arrived too late");
            return redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::AccessDenied, state).with_description("timeout"),
            );
        }

        if decision == Decision::Deny {
            info!(client_id = %pending.client_id, user_id, "Authorization denied by user");
            return redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::AccessDenied, state),
            );
        }

        if pending.response_type != ResponseType::Code {
            return redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::UnsupportedResponseType, state),
            );
        }

        self.issue_code(&target, &pending, user_id).await
    }

    /// `prompt=none`: answer immediately, never show UI.
    async fn authorize_silently(
        &self,
        target: &RedirectTarget,
        pending: PendingAuthorization,
        user_id: Option<&str>,
    ) -> AuthorizeOutcome {
        let state = pending.state.as_str();
        let fail = |code: ErrorCode| redirect_error(&target.redirect_uri, AuthorizationError::new(code, state));

        let user = match user_id {
            Some(id) => match self.users.find_by_id(id).await {
                Ok(user) => user,
                Err(e) => {
                    error!(error = %e, "Failed to look up session user");
                    return fail(ErrorCode::ServerError);
                }
            },
            None => None,
        };
        let Some(user) = user else {
            return fail(ErrorCode::LoginRequired);
        };

        match self
            .consent
            .has_consent(&target.client.id, &user.id, &pending.valid_scopes)
            .await
        {
            Ok(true) => {}
            Ok(false) => return fail(ErrorCode::ConsentRequired),
            Err(e) => {
                error!(error = %e, "Failed to evaluate prior consent");
                return fail(ErrorCode::ServerError);
            }
        }

        if pending.response_type != ResponseType::Code {
            return fail(ErrorCode::UnsupportedResponseType);
        }

        self.issue_code(target, &pending, &user.id).await
    }

    /// No prompt: log in if needed, then stage for the consent screen.
    fn authorize_interactively(
        &self,
        target: &RedirectTarget,
        pending: PendingAuthorization,
        request: &AuthorizationRequest,
        user_id: Option<&str>,
    ) -> AuthorizeOutcome {
        let state = pending.state.as_str();

        if pending.response_type != ResponseType::Code {
            return redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::UnsupportedResponseType, state),
            );
        }

        if user_id.is_none() {
            let back = format!("/oauth2/authorize?{}", request.to_query());
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("redirect", &back)
                .finish();
            return AuthorizeOutcome::Redirect(format!("{}?{query}", self.config.login_path));
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &pending.client_id)
            .append_pair("scopes", &pending.valid_scopes.to_string());
        if !pending.state.is_empty() {
            query.append_pair("state", &pending.state);
        }
        let location = format!("{}?{}", self.config.consent_path, query.finish());

        let on_failure = error_location(
            &target.redirect_uri,
            &AuthorizationError::new(ErrorCode::ServerError, state),
        );

        AuthorizeOutcome::Stage {
            pending,
            location,
            on_failure,
        }
    }

    /// Mints, persists and redirects with a fresh authorization code.
    async fn issue_code(
        &self,
        target: &RedirectTarget,
        pending: &PendingAuthorization,
        user_id: &str,
    ) -> AuthorizeOutcome {
        let code = pending.issue_code(user_id, self.config.code_lifetime());

        if let Err(e) = self.codes.create(&code).await {
            error!(error = %e, "Failed to persist authorization code");
            return redirect_error(
                &target.redirect_uri,
                AuthorizationError::new(ErrorCode::ServerError, pending.state.as_str()),
            );
        }

        info!(
            client_id = %code.client_id,
            user_id,
            scopes = %code.scopes,
            "Authorization code issued"
        );

        match AuthorizationResponse::new(code.code, pending.state.as_str())
            .to_redirect_url(&target.redirect_uri)
        {
            Ok(location) => AuthorizeOutcome::Redirect(location),
            Err(_) => AuthorizeOutcome::Reject(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Looks up the client and its redirect URI.
    async fn resolve_target(&self, client_id: &str) -> Result<RedirectTarget, StatusCode> {
        let client = match self.clients.find_by_client_id(client_id).await {
            Ok(Some(client)) => client,
            Ok(None) => {
                debug!(client_id, "Unknown client");
                return Err(StatusCode::BAD_REQUEST);
            }
            Err(e) => {
                error!(error = %e, "Failed to look up client");
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let Some(redirect_uri) = client.redirect_target().map(str::to_string) else {
            warn!(client_id, "Client has no usable redirect URI");
            return Err(StatusCode::FORBIDDEN);
        };

        Ok(RedirectTarget {
            client,
            redirect_uri,
        })
    }
}

fn error_location(redirect_uri: &str, error: &AuthorizationError) -> String {
    error
        .to_redirect_url(redirect_uri)
        .unwrap_or_else(|_| redirect_uri.to_string())
}

fn redirect_error(redirect_uri: &str, error: AuthorizationError) -> AuthorizeOutcome {
    match error.to_redirect_url(redirect_uri) {
        Ok(location) => AuthorizeOutcome::Redirect(location),
        Err(_) => AuthorizeOutcome::Reject(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
