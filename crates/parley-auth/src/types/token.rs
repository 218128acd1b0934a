//! Access/refresh token pairs.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::scope::ScopeSet;

/// An issued access token, optionally paired with a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Row identifier.
    pub id: String,

    /// Client the token was issued to. Always present.
    pub client_id: String,

    /// End-user the token acts for. `None` for `client_credentials`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Opaque access token value.
    pub access_token: String,

    /// Opaque refresh token value. Present iff refresh is enabled for the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Redirect URI copied from the client, for bookkeeping.
    #[serde(default)]
    pub redirect_uri: String,

    /// Scopes carried by the token.
    pub scopes: ScopeSet,

    /// When the token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl Token {
    /// Returns `true` if the row can be rotated with a `refresh_token` grant.
    #[must_use]
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Returns `true` if the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at
            .checked_add(Duration::seconds(self.expires_in))
            .is_some_and(|deadline| OffsetDateTime::now_utc() > deadline)
    }

    /// Returns `true` if `value` is this row's access or refresh token.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.access_token == value || self.refresh_token.as_deref() == Some(value)
    }
}
