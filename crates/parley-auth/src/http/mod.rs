//! HTTP handlers for the OAuth 2.0 endpoints.
//!
//! # Available Handlers
//!
//! - [`authorize`] - Authorization endpoint (`GET`/`POST /oauth2/authorize`)
//! - [`decide`] - Consent decision (`POST /oauth2/authorize/decide`)
//! - [`token`] - Token endpoint (`POST /oauth2/token`)
//! - [`revoke`] - Token revocation (`POST /oauth2/revoke`)
//! - [`session`] - Browser login/logout (`POST /login`, `POST /logout`)
//! - [`discovery`] - Authorization server metadata (RFC 8414)
//!
//! # Usage
//!
//! ```ignore
//! use parley_auth::http::{AuthBackends, AuthState, oauth_router};
//!
//! let state = AuthState::new(backends, config, cookie_key, issuer);
//! let app = axum::Router::new().merge(oauth_router(state));
//! ```

pub mod authorize;
pub mod decide;
pub mod discovery;
pub mod revoke;
pub mod session;
pub mod token;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::http::header::{CACHE_CONTROL, LOCATION, PRAGMA};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::Key;
use cookie::{Cookie, SameSite};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::error;
use url::Url;
use uuid::Uuid;

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::grant::GrantContext;
use crate::oauth::consent::ConsentEvaluator;
use crate::oauth::service::{AuthorizationService, AuthorizeOutcome};
use crate::storage::{
    AuthorizationCodeStorage, BrowserSession, ClientStorage, SessionStore, TokenStorage,
    UserDirectory,
};
use crate::token::{TokenConfig, TokenService};

/// Storage collaborators behind the endpoints.
#[derive(Clone)]
pub struct AuthBackends {
    /// Registered clients.
    pub clients: Arc<dyn ClientStorage>,
    /// Outstanding authorization codes.
    pub codes: Arc<dyn AuthorizationCodeStorage>,
    /// Issued tokens.
    pub tokens: Arc<dyn TokenStorage>,
    /// End-user directory.
    pub users: Arc<dyn UserDirectory>,
    /// Browser session store.
    pub sessions: Arc<dyn SessionStore>,
}

/// State shared by every OAuth handler.
#[derive(Clone)]
pub struct AuthState {
    /// Authorization and decision logic.
    pub authorization: Arc<AuthorizationService>,
    /// Token endpoint grants.
    pub grants: GrantContext,
    /// Issued tokens, for revocation.
    pub tokens: Arc<dyn TokenStorage>,
    /// End-user directory, for login.
    pub users: Arc<dyn UserDirectory>,
    /// Browser session store.
    pub sessions: Arc<dyn SessionStore>,
    /// OAuth settings.
    pub config: Arc<OAuthConfig>,
    /// Public base URL, used as the metadata `issuer`.
    pub issuer: Url,
    cookie_key: Key,
}

impl AuthState {
    /// Wires the services over `backends`.
    #[must_use]
    pub fn new(backends: AuthBackends, config: OAuthConfig, cookie_key: Key, issuer: Url) -> Self {
        let token_service = Arc::new(TokenService::new(
            backends.tokens.clone(),
            TokenConfig::from(&config),
        ));

        let authorization = Arc::new(AuthorizationService::new(
            backends.clients.clone(),
            backends.codes.clone(),
            backends.users.clone(),
            ConsentEvaluator::new(backends.tokens.clone()),
            config.clone(),
        ));

        let grants = GrantContext {
            clients: backends.clients,
            codes: backends.codes,
            users: backends.users.clone(),
            tokens: token_service,
        };

        Self {
            authorization,
            grants,
            tokens: backends.tokens,
            users: backends.users,
            sessions: backends.sessions,
            config: Arc::new(config),
            issuer,
            cookie_key,
        }
    }

    /// The browser session named by the request's cookie, if any.
    pub(crate) fn current_session(&self, jar: &SignedCookieJar) -> Option<BrowserSession> {
        jar.get(&self.config.session.cookie_name)
            .map(|cookie| self.bind_session(cookie.value().to_string()))
    }

    /// The logged-in user of the request's session, if any.
    pub(crate) async fn current_user(&self, jar: &SignedCookieJar) -> AuthResult<Option<String>> {
        match self.current_session(jar) {
            Some(session) => session.user_id().await,
            None => Ok(None),
        }
    }

    /// Returns the request's session, starting a new one if needed.
    pub(crate) fn ensure_session(&self, jar: SignedCookieJar) -> (SignedCookieJar, BrowserSession) {
        if let Some(session) = self.current_session(&jar) {
            return (jar, session);
        }

        let id = Uuid::new_v4().to_string();
        let jar = jar.add(self.session_cookie(id.clone()));
        (jar, self.bind_session(id))
    }

    /// Builds the signed session cookie for `session_id`.
    pub(crate) fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        let session = &self.config.session;
        let max_age = time::Duration::try_from(session.ttl).unwrap_or(time::Duration::MAX);

        Cookie::build((session.cookie_name.clone(), session_id))
            .http_only(true)
            .secure(session.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }

    pub(crate) fn bind_session(&self, id: String) -> BrowserSession {
        BrowserSession::new(self.sessions.clone(), id, self.config.session.ttl)
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Builds the router for every OAuth and session endpoint.
///
/// All responses carry `Cache-Control: no-store` and `Pragma: no-cache`.
pub fn oauth_router(state: AuthState) -> Router {
    Router::new()
        .route(
            "/oauth2/authorize",
            get(authorize::authorize_get).post(authorize::authorize_post),
        )
        .route("/oauth2/authorize/decide", post(decide::decide_handler))
        .route("/oauth2/token", post(token::token_handler))
        .route("/oauth2/revoke", post(revoke::revoke_handler))
        .route("/login", post(session::login_handler))
        .route("/logout", post(session::logout_handler))
        .route(
            "/.well-known/oauth-authorization-server",
            get(discovery::metadata_handler),
        )
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(state)
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => {
            error!("Redirect location is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Turns an authorization outcome into a response, staging if asked to.
pub(crate) async fn respond(
    state: &AuthState,
    jar: SignedCookieJar,
    outcome: AuthorizeOutcome,
) -> Response {
    match outcome {
        AuthorizeOutcome::Reject(status) => status.into_response(),
        AuthorizeOutcome::Redirect(location) => found(&location),
        AuthorizeOutcome::Stage {
            pending,
            location,
            on_failure,
        } => {
            let (jar, session) = state.ensure_session(jar);
            match session.stage(&pending).await {
                Ok(()) => (jar, found(&location)).into_response(),
                Err(e) => {
                    error!(error = %e, client_id = %pending.client_id, "Failed to stage authorization request");
                    found(&on_failure)
                }
            }
        }
    }
}
