//! Browser login and logout.
//!
//! A successful login starts a fresh session, records the user in it and
//! sets the signed session cookie. Both endpoints honour a `redirect`
//! query parameter as long as it is a local path that stays on the
//! issuer's origin; otherwise they answer `204 No Content`.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::SignedCookieJar;
use cookie::Cookie;
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

use super::{AuthState, found};

/// Login form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Login name.
    pub name: String,
    /// Plain-text password.
    #[serde(alias = "pass")]
    pub password: String,
}

/// Optional post-login/logout destination.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedirectQuery {
    /// Local path to continue at.
    pub redirect: String,
}

/// `POST /login`
pub async fn login_handler(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match state.users.find_by_name(&form.name).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let Some(user) = user else {
        info!(username = %form.name, "Login attempt failed: unknown user");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.users.verify_password(&user, &form.password).await {
        Ok(true) => {}
        Ok(false) => {
            info!(username = %form.name, "Login attempt failed: wrong password");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to verify password");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    // A login always starts a new session id.
    if let Some(previous) = state.current_session(&jar)
        && let Err(e) = previous.destroy().await
    {
        error!(error = %e, "Failed to destroy previous session");
    }

    let session_id = Uuid::new_v4().to_string();
    let session = state.bind_session(session_id.clone());
    if let Err(e) = session.set_user_id(&user.id).await {
        error!(error = %e, "Failed to store login in session");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!(username = %form.name, user_id = %user.id, "Login succeeded");

    let jar = jar.add(state.session_cookie(session_id));
    (jar, continue_at(&state.issuer, &query.redirect)).into_response()
}

/// `POST /logout`
pub async fn logout_handler(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    if let Some(session) = state.current_session(&jar)
        && let Err(e) = session.destroy().await
    {
        error!(error = %e, "Failed to destroy session");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let jar = jar.remove(Cookie::build(state.config.session.cookie_name.clone()).path("/"));
    (jar, continue_at(&state.issuer, &query.redirect)).into_response()
}

fn continue_at(issuer: &Url, redirect: &str) -> Response {
    if is_local_path(issuer, redirect) {
        found(redirect)
    } else {
        if !redirect.is_empty() {
            debug!(redirect = %redirect.escape_debug(), "Ignoring off-site redirect");
        }
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Accepts `/path?query` that resolves onto the issuer's origin.
///
/// Browsers drop tabs and newlines while parsing a `Location`, so any
/// whitespace or control character is refused outright.
fn is_local_path(issuer: &Url, redirect: &str) -> bool {
    if !redirect.starts_with('/')
        || redirect
            .chars()
            .any(|c| c.is_control() || c.is_whitespace())
    {
        return false;
    }

    match Url::options().base_url(Some(issuer)).parse(redirect) {
        Ok(target) => target.origin() == issuer.origin(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> Url {
        Url::parse("https://auth.example.com/").unwrap()
    }

    #[test]
    fn test_is_local_path() {
        let issuer = issuer();
        assert!(is_local_path(&issuer, "/oauth2/authorize?client_id=x"));
        assert!(is_local_path(&issuer, "/"));
        assert!(is_local_path(&issuer, "/%09/still-local"));
        assert!(!is_local_path(&issuer, ""));
        assert!(!is_local_path(&issuer, "https://evil.example.com/"));
        assert!(!is_local_path(&issuer, "//evil.example.com/"));
        assert!(!is_local_path(&issuer, "/\\evil.example.com"));
    }

    #[test]
    fn test_is_local_path_rejects_stripped_characters() {
        let issuer = issuer();
        assert!(!is_local_path(&issuer, "/\t/evil.example.com/"));
        assert!(!is_local_path(&issuer, "/\r/evil.example.com/"));
        assert!(!is_local_path(&issuer, "/\n/evil.example.com/"));
        assert!(!is_local_path(&issuer, "/\r\n/evil.example.com/"));
        assert!(!is_local_path(&issuer, "/ /evil.example.com/"));
        assert!(!is_local_path(&issuer, "/\u{0}/evil.example.com/"));
    }

    #[test]
    fn test_continue_at() {
        let issuer = issuer();

        let resp = continue_at(&issuer, "/oauth2/authorize?client_id=x");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()["location"],
            "/oauth2/authorize?client_id=x"
        );

        let resp = continue_at(&issuer, "/\t/evil.example.com/");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get("location").is_none());

        assert_eq!(continue_at(&issuer, "").status(), StatusCode::NO_CONTENT);
    }
}
