//! Authorization server metadata (RFC 8414).
//!
//! Provides `/.well-known/oauth-authorization-server`.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use url::Url;

use super::AuthState;
use crate::oauth::pkce::PkceMethod;
use crate::scope::Scope;
use crate::types::GrantType;

/// Authorization server metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMetadata {
    /// Issuer identifier (the public base URL).
    pub issuer: String,
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Revocation endpoint URL.
    pub revocation_endpoint: String,
    /// Supported `response_type` values.
    pub response_types_supported: Vec<String>,
    /// Supported `grant_type` values.
    pub grant_types_supported: Vec<String>,
    /// Scopes clients may request.
    pub scopes_supported: Vec<String>,
    /// Supported PKCE methods.
    pub code_challenge_methods_supported: Vec<String>,
    /// Supported client authentication methods at the token endpoint.
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

impl ServerMetadata {
    /// Builds the document for an issuer.
    #[must_use]
    pub fn build(issuer: &Url) -> Self {
        let endpoint = |path: &str| {
            issuer
                .join(path)
                .map_or_else(|_| path.to_string(), |url| url.to_string())
        };

        Self {
            issuer: issuer.as_str().trim_end_matches('/').to_string(),
            authorization_endpoint: endpoint("/oauth2/authorize"),
            token_endpoint: endpoint("/oauth2/token"),
            revocation_endpoint: endpoint("/oauth2/revoke"),
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: GrantType::ALL.iter().map(|g| g.as_str().to_string()).collect(),
            scopes_supported: Scope::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            code_challenge_methods_supported: [PkceMethod::Plain, PkceMethod::S256]
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            token_endpoint_auth_methods_supported: vec![
                "client_secret_basic".to_string(),
                "client_secret_post".to_string(),
                "none".to_string(),
            ],
        }
    }
}

/// `GET /.well-known/oauth-authorization-server`
pub async fn metadata_handler(State(state): State<AuthState>) -> Json<ServerMetadata> {
    Json(ServerMetadata::build(&state.issuer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_endpoints() {
        let issuer = Url::parse("https://auth.example.com/").unwrap();
        let metadata = ServerMetadata::build(&issuer);

        assert_eq!(metadata.issuer, "https://auth.example.com");
        assert_eq!(metadata.token_endpoint, "https://auth.example.com/oauth2/token");
        assert_eq!(metadata.response_types_supported, vec!["code"]);
        assert!(metadata.grant_types_supported.contains(&"client_credentials".to_string()));
        assert_eq!(metadata.code_challenge_methods_supported, vec!["plain", "S256"]);
        assert!(metadata.scopes_supported.contains(&"manage_bot".to_string()));
    }
}
