//! Token endpoint request and response types.

use serde::{Deserialize, Serialize};

use crate::scope::ScopeSet;
use crate::types::Token;

/// Token request parameters.
///
/// This structure handles every grant type. Different fields are required
/// depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri, (optional) code_verifier
/// - `password`: username, password, (optional) scope
/// - `client_credentials`: (optional) scope
/// - `refresh_token`: refresh_token, (optional) scope
///
/// Client credentials may come from the `Authorization: Basic` header
/// instead of `client_id` / `client_secret`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. Missing values are reported as unsupported.
    #[serde(default)]
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match the one bound to the code).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (for authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client ID (for public clients or client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope (space-separated).
    #[serde(default)]
    pub scope: Option<String>,

    /// Username (for password grant).
    #[serde(default)]
    pub username: Option<String>,

    /// Password (for password grant).
    #[serde(default)]
    pub password: Option<String>,
}

/// Returns the value if present and non-empty.
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "Qm9vdGhVbmljb3JuU3BhcmtsZUdyYXBlMTIz",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "refresh_token": "TWlkbmlnaHRQZW5ndWluVGFuZ29MYW1wNDU2",
///   "scope": "read"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Refresh token, if the row is refresh-enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scopes, only when they differ from what was asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Builds the response for an issued token, without `scope`.
    #[must_use]
    pub fn from_token(token: &Token) -> Self {
        Self {
            access_token: token.access_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: token.expires_in,
            refresh_token: token.refresh_token.clone(),
            scope: None,
        }
    }

    /// Sets `scope` if `narrowed` is true.
    #[must_use]
    pub fn with_scope_if(mut self, narrowed: bool, scopes: &ScopeSet) -> Self {
        if narrowed {
            self.scope = Some(scopes.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn token(refresh: Option<&str>) -> Token {
        Token {
            id: "id".into(),
            client_id: "client".into(),
            user_id: None,
            access_token: "access".into(),
            refresh_token: refresh.map(str::to_string),
            redirect_uri: String::new(),
            scopes: ScopeSet::parse("read write"),
            created_at: OffsetDateTime::now_utc(),
            expires_in: 3600,
        }
    }

    #[test]
    fn test_response_omits_optional_fields() {
        let response = TokenResponse::from_token(&token(None));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("scope").is_none());
    }

    #[test]
    fn test_response_scope_when_narrowed() {
        let t = token(Some("refresh"));
        let response = TokenResponse::from_token(&t).with_scope_if(true, &t.scopes);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["refresh_token"], "refresh");
        assert_eq!(json["scope"], "read write");
    }

    #[test]
    fn test_request_defaults() {
        let request: TokenRequest = serde_json::from_str(r#"{"code": "abc"}"#).unwrap();
        assert_eq!(request.grant_type, "");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert_eq!(non_empty(request.code.as_ref()), Some("abc"));
        assert_eq!(non_empty(Some(&String::new())), None);
    }
}
