//! Staged authorization requests.
//!
//! Between the authorization endpoint and the decide step the validated
//! request lives in the end-user's browser session as a
//! [`PendingAuthorization`]. It carries its own staging time; the timeout is
//! checked when the decision arrives, not by a background sweep.
//!
//! # Lifecycle
//!
//! 1. Staged by `GET /oauth2/authorize` (interactive flow)
//! 2. Read and removed by `POST /oauth2/authorize/decide`
//! 3. Turned into an [`AuthorizationCode`] on approval

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::pkce::CodeChallenge;
use super::response_type::ResponseType;
use crate::scope::ScopeSet;
use crate::token::generate_secret;
use crate::types::AuthorizationCode;

/// A validated authorization request awaiting the end-user's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    /// Decoded `response_type`.
    pub response_type: ResponseType,

    /// Requesting client.
    pub client_id: String,

    /// `redirect_uri` as presented (may be empty).
    pub redirect_uri: String,

    /// Scopes the client asked for.
    pub scopes: ScopeSet,

    /// Requested scopes narrowed to the client's maximum.
    pub valid_scopes: ScopeSet,

    /// Opaque client state, echoed on redirect.
    #[serde(default)]
    pub state: String,

    /// Opaque OpenID Connect nonce.
    #[serde(default)]
    pub nonce: String,

    /// PKCE challenge, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<CodeChallenge>,

    /// When the request was staged.
    #[serde(with = "time::serde::rfc3339")]
    pub access_time: OffsetDateTime,
}

impl PendingAuthorization {
    /// Returns `true` if more than `timeout` has passed since staging.
    #[must_use]
    pub fn is_timed_out_at(&self, now: OffsetDateTime, timeout: Duration) -> bool {
        self.access_time
            .checked_add(timeout)
            .is_some_and(|deadline| now > deadline)
    }

    /// Mints the authorization code for an approved request.
    ///
    /// The granted scopes are the valid scopes; the requested scopes are
    /// kept as the originals so the token response can report narrowing.
    #[must_use]
    pub fn issue_code(&self, user_id: &str, lifetime: Duration) -> AuthorizationCode {
        AuthorizationCode {
            code: generate_secret(),
            client_id: self.client_id.clone(),
            user_id: user_id.to_string(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.valid_scopes.clone(),
            original_scopes: self.scopes.clone(),
            nonce: self.nonce.clone(),
            code_challenge: self.code_challenge.clone(),
            created_at: OffsetDateTime::now_utc(),
            expires_in: lifetime.whole_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::pkce::PkceMethod;

    fn pending() -> PendingAuthorization {
        PendingAuthorization {
            response_type: ResponseType::Code,
            client_id: "client-1".into(),
            redirect_uri: "https://app.example.com/cb".into(),
            scopes: ScopeSet::parse("read manage_bot"),
            valid_scopes: ScopeSet::parse("read"),
            state: "xyz".into(),
            nonce: "n-0S6".into(),
            code_challenge: Some(CodeChallenge {
                challenge: "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".into(),
                method: PkceMethod::S256,
            }),
            access_time: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_timeout() {
        let p = pending();
        let five = Duration::minutes(5);
        assert!(!p.is_timed_out_at(p.access_time + Duration::minutes(4), five));
        assert!(p.is_timed_out_at(p.access_time + Duration::minutes(6), five));
    }

    #[test]
    fn test_issue_code_copies_request() {
        let p = pending();
        let code = p.issue_code("user-1", Duration::minutes(5));

        assert_eq!(code.code.len(), 36);
        assert_eq!(code.client_id, "client-1");
        assert_eq!(code.user_id, "user-1");
        assert_eq!(code.redirect_uri, p.redirect_uri);
        assert_eq!(code.scopes, ScopeSet::parse("read"));
        assert_eq!(code.original_scopes, ScopeSet::parse("read manage_bot"));
        assert_eq!(code.nonce, "n-0S6");
        assert_eq!(code.code_challenge, p.code_challenge);
        assert_eq!(code.expires_in, 300);
        assert!(code.scope_was_narrowed());
    }

    #[test]
    fn test_serde_round_trip_keeps_access_time() {
        let p = pending();
        let json = serde_json::to_string(&p).unwrap();
        let back: PendingAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back.response_type, ResponseType::Code);
        assert_eq!(back.access_time.unix_timestamp(), p.access_time.unix_timestamp());
    }
}
