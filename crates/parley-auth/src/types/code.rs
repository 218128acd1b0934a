//! Authorization codes.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::oauth::pkce::CodeChallenge;
use crate::scope::ScopeSet;

/// A single-use authorization code bound to a client, user and redirect URI.
///
/// Codes are minted by the decide step (or directly by `prompt=none`) and
/// consumed by the `authorization_code` grant. The lifetime is stored as
/// signed seconds so that an already-expired code can be constructed
/// directly; the authorization flows only ever mint positive lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The opaque code value.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// End-user who approved the request.
    pub user_id: String,

    /// `redirect_uri` as presented at the authorization endpoint (may be empty).
    pub redirect_uri: String,

    /// Granted scopes (requested narrowed to the client's maximum).
    pub scopes: ScopeSet,

    /// Scopes the client asked for before narrowing.
    pub original_scopes: ScopeSet,

    /// Opaque OpenID Connect nonce, passed through.
    #[serde(default)]
    pub nonce: String,

    /// PKCE challenge, if the request carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<CodeChallenge>,

    /// When the code was minted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Lifetime in seconds from `created_at`.
    pub expires_in: i64,
}

impl AuthorizationCode {
    /// When the code stops being exchangeable.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.created_at.checked_add(Duration::seconds(self.expires_in))
    }

    /// Returns `true` if the code has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|deadline| now > deadline)
    }

    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Returns `true` if the token response should echo `scope`.
    #[must_use]
    pub fn scope_was_narrowed(&self) -> bool {
        self.scopes != self.original_scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(expires_in: i64) -> AuthorizationCode {
        AuthorizationCode {
            code: "c".repeat(36),
            client_id: "client".into(),
            user_id: "user".into(),
            redirect_uri: String::new(),
            scopes: ScopeSet::parse("read"),
            original_scopes: ScopeSet::parse("read"),
            nonce: String::new(),
            code_challenge: None,
            created_at: OffsetDateTime::now_utc(),
            expires_in,
        }
    }

    #[test]
    fn test_expiry() {
        assert!(!code(300).is_expired());
        assert!(code(-10).is_expired());

        let c = code(60);
        assert!(c.is_expired_at(c.created_at + Duration::seconds(61)));
        assert!(!c.is_expired_at(c.created_at + Duration::seconds(60)));
    }

    #[test]
    fn test_scope_was_narrowed() {
        let mut c = code(300);
        assert!(!c.scope_was_narrowed());

        c.original_scopes = ScopeSet::parse("read manage_bot");
        assert!(c.scope_was_narrowed());
    }
}
