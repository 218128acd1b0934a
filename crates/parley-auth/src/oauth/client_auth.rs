//! Client authentication at the token endpoint.
//!
//! Clients present credentials either as HTTP Basic
//! (`client_secret_basic`) or as form fields (`client_secret_post`). Basic
//! takes precedence when both are present. Public clients authenticate by
//! `client_id` alone.
//!
//! # Failure mapping
//!
//! | Situation | Response |
//! |---|---|
//! | no credentials at all | `400 invalid_client` |
//! | unknown `client_id` | `400 invalid_client` |
//! | confidential client, wrong or missing secret | `401 invalid_client` |

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use tracing::debug;

use super::error::TokenError;
use super::token::{TokenRequest, non_empty};
use crate::storage::ClientStorage;
use crate::types::Client;

/// Credentials presented by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Presented client id.
    pub client_id: String,
    /// Presented secret, if any.
    pub client_secret: Option<String>,
}

/// Extracts client credentials from the `Authorization` header or the form.
#[must_use]
pub fn extract_credentials(headers: &HeaderMap, request: &TokenRequest) -> Option<ClientCredentials> {
    let basic = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);

    if let Some((client_id, client_secret)) = basic {
        return Some(ClientCredentials {
            client_id,
            client_secret: Some(client_secret),
        });
    }

    non_empty(request.client_id.as_ref()).map(|client_id| ClientCredentials {
        client_id: client_id.to_string(),
        client_secret: request.client_secret.clone(),
    })
}

/// Resolves and authenticates the client behind `credentials`.
///
/// # Errors
///
/// Returns a [`TokenError`] ready to be sent to the client; storage
/// failures become `500 server_error`.
pub async fn authenticate_client(
    storage: &dyn ClientStorage,
    credentials: Option<&ClientCredentials>,
) -> Result<Client, TokenError> {
    let Some(credentials) = credentials else {
        debug!("No client credentials provided");
        return Err(TokenError::unknown_client());
    };

    let client = storage
        .find_by_client_id(&credentials.client_id)
        .await?
        .ok_or_else(|| {
            debug!(client_id = %credentials.client_id, "Unknown client");
            TokenError::unknown_client()
        })?;

    let presented = credentials.client_secret.as_deref().unwrap_or_default();
    if !client.secret_matches(presented) {
        debug!(client_id = %client.id, "Client secret mismatch");
        return Err(TokenError::client_auth_failed());
    }

    Ok(client)
}

/// Parse HTTP Basic authentication header.
///
/// Returns `Some((client_id, client_secret))` if valid, `None` otherwise.
///
/// # Example
///
/// ```ignore
/// let auth_header = "Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=";
/// if let Some((id, secret)) = parse_basic_auth(auth_header) {
///     println!("client_id: {}, secret: {}", id, secret);
/// }
/// ```
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    // Auth schemes are case-insensitive
    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Split on first colon (secret may contain colons)
    let (client_id, client_secret) = credentials.split_once(':')?;
    if client_id.is_empty() {
        return None;
    }

    Some((client_id.to_string(), client_secret.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthResult;
    use crate::error::AuthError;
    use crate::oauth::error::ErrorCode;
    use async_trait::async_trait;
    use axum::http::{HeaderValue, StatusCode};
    use std::collections::HashMap;

    /// Mock client storage for testing.
    struct MockClientStorage {
        clients: HashMap<String, Client>,
        fail: bool,
    }

    impl MockClientStorage {
        fn new() -> Self {
            let public = Client::new("public", "u").with_id("public-app");
            let confidential = Client::new("confidential", "u")
                .with_id("server-app")
                .with_secret("s3cret")
                .confidential(true);
            Self {
                clients: [public, confidential]
                    .into_iter()
                    .map(|c| (c.id.clone(), c))
                    .collect(),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ClientStorage for MockClientStorage {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            if self.fail {
                return Err(AuthError::storage("unavailable"));
            }
            Ok(self.clients.get(client_id).cloned())
        }
        async fn create(&self, client: &Client) -> AuthResult<Client> {
            Ok(client.clone())
        }
        async fn list_by_creator(&self, _creator_id: &str) -> AuthResult<Vec<Client>> {
            Ok(Vec::new())
        }
        async fn update(&self, client: &Client) -> AuthResult<Client> {
            Ok(client.clone())
        }
        async fn delete(&self, _client_id: &str) -> AuthResult<()> {
            Ok(())
        }
    }

    fn creds(id: &str, secret: Option<&str>) -> ClientCredentials {
        ClientCredentials {
            client_id: id.to_string(),
            client_secret: secret.map(str::to_string),
        }
    }

    // -------------------------------------------------------------------------
    // Basic auth parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_basic_auth() {
        // client_id:client_secret
        let parsed = parse_basic_auth("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=");
        assert_eq!(
            parsed,
            Some(("client_id".to_string(), "client_secret".to_string()))
        );
    }

    #[test]
    fn test_parse_basic_auth_secret_with_colon() {
        // app:a:b
        let parsed = parse_basic_auth("Basic YXBwOmE6Yg==");
        assert_eq!(parsed, Some(("app".to_string(), "a:b".to_string())));
    }

    #[test]
    fn test_parse_basic_auth_scheme_case() {
        let expected = Some(("client_id".to_string(), "client_secret".to_string()));
        assert_eq!(parse_basic_auth("basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ="), expected);
        assert_eq!(parse_basic_auth("BASIC Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ="), expected);
    }

    #[test]
    fn test_parse_basic_auth_invalid() {
        assert_eq!(parse_basic_auth("Bearer abc"), None);
        assert_eq!(parse_basic_auth("Basic !!!"), None);
        // "nocolon"
        assert_eq!(parse_basic_auth("Basic bm9jb2xvbg=="), None);
    }

    // -------------------------------------------------------------------------
    // Credential extraction
    // -------------------------------------------------------------------------

    #[test]
    fn test_basic_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ="),
        );
        let request = TokenRequest {
            client_id: Some("form-id".into()),
            client_secret: Some("form-secret".into()),
            ..TokenRequest::default()
        };

        let extracted = extract_credentials(&headers, &request).unwrap();
        assert_eq!(extracted, creds("client_id", Some("client_secret")));
    }

    #[test]
    fn test_form_credentials() {
        let request = TokenRequest {
            client_id: Some("public-app".into()),
            ..TokenRequest::default()
        };
        let extracted = extract_credentials(&HeaderMap::new(), &request).unwrap();
        assert_eq!(extracted, creds("public-app", None));

        assert!(extract_credentials(&HeaderMap::new(), &TokenRequest::default()).is_none());
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_public_client_needs_only_id() {
        let storage = MockClientStorage::new();
        let client = authenticate_client(&storage, Some(&creds("public-app", None)))
            .await
            .unwrap();
        assert_eq!(client.id, "public-app");

        // A secret sent by a public client is not checked.
        assert!(
            authenticate_client(&storage, Some(&creds("public-app", Some("junk"))))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_confidential_client() {
        let storage = MockClientStorage::new();
        assert!(
            authenticate_client(&storage, Some(&creds("server-app", Some("s3cret"))))
                .await
                .is_ok()
        );

        let err = authenticate_client(&storage, Some(&creds("server-app", Some("wrong"))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.body.error, ErrorCode::InvalidClient);

        let err = authenticate_client(&storage, Some(&creds("server-app", None)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_or_missing_client() {
        let storage = MockClientStorage::new();
        let err = authenticate_client(&storage, Some(&creds("nobody", Some("x"))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, ErrorCode::InvalidClient);

        let err = authenticate_client(&storage, None).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, ErrorCode::InvalidClient);
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let storage = MockClientStorage {
            fail: true,
            ..MockClientStorage::new()
        };
        let err = authenticate_client(&storage, Some(&creds("public-app", None)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
