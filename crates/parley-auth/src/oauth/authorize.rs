//! Authorization endpoint types.
//!
//! # Authorization Code Flow
//!
//! 1. Client sends the user agent to `/oauth2/authorize`
//! 2. The end-user logs in and the request is staged in their session
//! 3. The end-user approves or denies at `/oauth2/authorize/decide`
//! 4. Server redirects back to the client with a `code`
//! 5. Client exchanges the code at the token endpoint
//!
//! With `prompt=none` steps 2 and 3 are skipped when the end-user is logged
//! in and has already granted the client the requested scopes.

use serde::Deserialize;
use url::form_urlencoded;

/// Authorization request parameters.
///
/// Received as query parameters (GET) or form fields (POST). Every field
/// is optional at the transport level; validation happens in
/// [`crate::oauth::service::AuthorizationService::authorize`].
///
/// # Example
///
/// ```ignore
/// GET /oauth2/authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &scope=read write
///   &state=abc123xyz
///   &code_challenge=E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM
///   &code_challenge_method=S256
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizationRequest {
    /// Must decode to exactly one of `code`, `token`, `none`.
    pub response_type: String,

    /// Client identifier issued during registration.
    pub client_id: String,

    /// Must equal the client's registered redirect URI when present.
    pub redirect_uri: String,

    /// Requested scopes (space-separated). Defaults to the client's scopes.
    pub scope: String,

    /// Opaque client state, echoed on every redirect.
    pub state: String,

    /// OpenID Connect nonce, passed through to the code.
    pub nonce: String,

    /// Either empty or `none`.
    pub prompt: String,

    /// PKCE code challenge.
    pub code_challenge: String,

    /// PKCE code challenge method (`plain` or `S256`).
    pub code_challenge_method: String,
}

impl AuthorizationRequest {
    /// Re-encodes the non-empty parameters as a query string.
    ///
    /// Used to send the end-user back to the same request after login.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in [
            ("response_type", &self.response_type),
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
            ("scope", &self.scope),
            ("state", &self.state),
            ("nonce", &self.nonce),
            ("prompt", &self.prompt),
            ("code_challenge", &self.code_challenge),
            ("code_challenge_method", &self.code_challenge_method),
        ] {
            if !value.is_empty() {
                query.append_pair(name, value);
            }
        }
        query.finish()
    }
}

/// Successful authorization response.
///
/// ```ignore
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?code=SplxlOBeZQQYbYS6WxSbIA&state=abc123xyz
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    /// Authorization code to be exchanged for tokens.
    pub code: String,

    /// Echoed state; omitted from the redirect when empty.
    pub state: String,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: state.into(),
        }
    }

    /// Builds the redirect URL with response parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `redirect_uri` is not an absolute URL.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &self.code);
            if !self.state.is_empty() {
                pairs.append_pair("state", &self.state);
            }
        }
        Ok(url.to_string())
    }
}
