//! OAuth 2.0 protocol errors.
//!
//! One closed [`ErrorCode`] taxonomy is shared by both transports:
//!
//! - [`AuthorizationError`] is encoded into the query of a redirect back to
//!   the client (authorize and decide steps).
//! - [`TokenError`] is a JSON body with an HTTP status (token step).

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// OAuth 2.0 error codes (RFC 6749 sections 4.1.2.1 and 5.2, OIDC prompt errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is missing a parameter or is otherwise malformed.
    InvalidRequest,
    /// Client authentication failed.
    InvalidClient,
    /// The code or refresh token is invalid, expired, revoked or mismatched.
    InvalidGrant,
    /// The requested scope is invalid, unknown or exceeds what is allowed.
    InvalidScope,
    /// The client may not use this grant type.
    UnauthorizedClient,
    /// The grant type is not supported.
    UnsupportedGrantType,
    /// The response type is not supported.
    UnsupportedResponseType,
    /// The resource owner denied the request.
    AccessDenied,
    /// `prompt=none` was sent but no end-user is logged in.
    LoginRequired,
    /// `prompt=none` was sent but the end-user has not consented yet.
    ConsentRequired,
    /// An unexpected condition prevented the request from being fulfilled.
    ServerError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::AccessDenied => "access_denied",
            Self::LoginRequired => "login_required",
            Self::ConsentRequired => "consent_required",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Redirect transport
// =============================================================================

/// An error reported by redirecting the user agent back to the client.
///
/// ```ignore
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?error=access_denied&state=xyz
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationError {
    /// OAuth 2.0 error code.
    pub error: ErrorCode,
    /// Human-readable error description (optional).
    pub error_description: Option<String>,
    /// Echoed `state`; omitted from the redirect when empty.
    pub state: String,
}

impl AuthorizationError {
    /// Creates a new authorization error.
    #[must_use]
    pub fn new(error: ErrorCode, state: impl Into<String>) -> Self {
        Self {
            error,
            error_description: None,
            state: state.into(),
        }
    }

    /// Attaches an `error_description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }

    /// Builds the redirect URL with error parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `redirect_uri` is not an absolute URL.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("error", self.error.as_str());
            if let Some(ref desc) = self.error_description {
                pairs.append_pair("error_description", desc);
            }
            if !self.state.is_empty() {
                pairs.append_pair("state", &self.state);
            }
        }
        Ok(url.to_string())
    }
}

// =============================================================================
// JSON transport
// =============================================================================

/// Body of a token endpoint error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenErrorBody {
    /// OAuth 2.0 error code.
    pub error: ErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// An error reported by the token endpoint as a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Response body.
    pub body: TokenErrorBody,
}

impl TokenError {
    /// Creates a token error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, error: ErrorCode) -> Self {
        Self {
            status,
            body: TokenErrorBody {
                error,
                error_description: None,
            },
        }
    }

    /// Attaches an `error_description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.body.error_description = Some(description.into());
        self
    }

    /// `400 invalid_request`
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest)
    }

    /// `400 invalid_grant`
    #[must_use]
    pub fn invalid_grant() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidGrant)
    }

    /// `400 invalid_scope`
    #[must_use]
    pub fn invalid_scope() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidScope)
    }

    /// `400 unsupported_grant_type`
    #[must_use]
    pub fn unsupported_grant_type() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::UnsupportedGrantType)
    }

    /// `400 invalid_client`: no credentials, or an unknown client id.
    #[must_use]
    pub fn unknown_client() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidClient)
    }

    /// `401 invalid_client`: a registered client failed to authenticate.
    #[must_use]
    pub fn client_auth_failed() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::InvalidClient)
    }

    /// `401 unauthorized_client`
    #[must_use]
    pub fn unauthorized_client() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::UnauthorizedClient)
    }

    /// `500 server_error`
    #[must_use]
    pub fn server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::ServerError)
    }
}

impl From<AuthError> for TokenError {
    fn from(err: AuthError) -> Self {
        tracing::error!(error = %err, "Token request failed on a collaborator");
        Self::server_error()
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::InvalidRequest.as_str(), "invalid_request");
        assert_eq!(ErrorCode::LoginRequired.as_str(), "login_required");
        assert_eq!(ErrorCode::ConsentRequired.as_str(), "consent_required");
        assert_eq!(
            serde_json::to_string(&ErrorCode::UnsupportedResponseType).unwrap(),
            "\"unsupported_response_type\""
        );
    }

    #[test]
    fn test_redirect_url_with_state() {
        let err = AuthorizationError::new(ErrorCode::AccessDenied, "xyz");
        let url = err.to_redirect_url("https://app.example.com/cb").unwrap();
        assert_eq!(url, "https://app.example.com/cb?error=access_denied&state=xyz");
    }

    #[test]
    fn test_redirect_url_omits_empty_state() {
        let err = AuthorizationError::new(ErrorCode::AccessDenied, "").with_description("timeout");
        let url = err.to_redirect_url("https://app.example.com/cb?x=1").unwrap();
        assert_eq!(
            url,
            "https://app.example.com/cb?x=1&error=access_denied&error_description=timeout"
        );
    }

    #[test]
    fn test_redirect_url_rejects_relative() {
        let err = AuthorizationError::new(ErrorCode::InvalidScope, "");
        assert!(err.to_redirect_url("/callback").is_err());
    }

    #[test]
    fn test_token_error_body() {
        let err = TokenError::client_auth_failed();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        let json = serde_json::to_string(&err.body).unwrap();
        assert_eq!(json, r#"{"error":"invalid_client"}"#);

        let err = TokenError::invalid_grant().with_description("expired");
        let json = serde_json::to_string(&err.body).unwrap();
        assert!(json.contains(r#""error_description":"expired""#));
    }

    #[test]
    fn test_infrastructure_errors_become_server_error() {
        let err: TokenError = AuthError::storage("down").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, ErrorCode::ServerError);
    }
}
