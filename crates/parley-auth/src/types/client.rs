//! OAuth 2.0 client registrations.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::scope::ScopeSet;
use crate::token::generate_secret;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types served by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with PKCE for public clients).
    AuthorizationCode,
    /// Resource Owner Password Credentials flow.
    Password,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Every supported grant type.
    pub const ALL: [GrantType; 4] = [
        GrantType::AuthorizationCode,
        GrantType::Password,
        GrantType::ClientCredentials,
        GrantType::RefreshToken,
    ];

    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "password" => Some(Self::Password),
            "client_credentials" => Some(Self::ClientCredentials),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }

    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered OAuth 2.0 client.
///
/// Registration and edits happen outside the authorization flows; the flows
/// only read clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Server-generated unique client identifier.
    pub id: String,

    /// Client secret. Only checked for confidential clients.
    pub secret: String,

    /// Human-readable display name.
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Whether the client can keep its secret.
    pub confidential: bool,

    /// The user who registered the client.
    pub creator_id: String,

    /// The single registered redirect URI, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Maximum set of scopes the client may be granted.
    pub scopes: ScopeSet,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Creates a public client with a fresh id and secret and no scopes.
    #[must_use]
    pub fn new(name: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            secret: generate_secret(),
            name: name.into(),
            description: String::new(),
            confidential: false,
            creator_id: creator_id.into(),
            redirect_uri: None,
            scopes: ScopeSet::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Overrides the generated client id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Overrides the generated secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the client as confidential.
    #[must_use]
    pub fn confidential(mut self, confidential: bool) -> Self {
        self.confidential = confidential;
        self
    }

    /// Registers a redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Sets the maximum grantable scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    /// Returns the registered redirect URI if it is an absolute URL.
    ///
    /// A client without one cannot be redirected to.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_uri
            .as_deref()
            .filter(|uri| url::Url::parse(uri).is_ok())
    }

    /// Checks a presented secret. Public clients accept any secret.
    #[must_use]
    pub fn secret_matches(&self, presented: &str) -> bool {
        !self.confidential || self.secret == presented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_parse() {
        for grant in GrantType::ALL {
            assert_eq!(GrantType::parse(grant.as_str()), Some(grant));
        }
        assert_eq!(GrantType::parse("implicit"), None);
    }

    #[test]
    fn test_new_client_generates_credentials() {
        let a = Client::new("bot", "user-1");
        let b = Client::new("bot", "user-1");
        assert_ne!(a.id, b.id);
        assert_eq!(a.secret.len(), 36);
        assert!(!a.confidential);
    }

    #[test]
    fn test_secret_matches() {
        let public = Client::new("app", "u").with_secret("s3cret");
        assert!(public.secret_matches("anything"));

        let confidential = public.clone().confidential(true);
        assert!(confidential.secret_matches("s3cret"));
        assert!(!confidential.secret_matches("wrong"));
        assert!(!confidential.secret_matches(""));
    }

    #[test]
    fn test_redirect_target() {
        let client = Client::new("app", "u");
        assert_eq!(client.redirect_target(), None);

        let client = client.with_redirect_uri("not a url");
        assert_eq!(client.redirect_target(), None);

        let client = client.with_redirect_uri("https://app.example.com/cb");
        assert_eq!(client.redirect_target(), Some("https://app.example.com/cb"));
    }
}
