//! Authorization server configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [oauth]
//! authorization_code_lifetime = "5m"
//! access_token_lifetime = "1h"
//! issue_refresh_tokens = true
//!
//! [oauth.session]
//! cookie_name = "parley_session"
//! ttl = "7d"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth 2.0 settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// How long an authorization code may be exchanged.
    /// Default: 5 minutes
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime reported as `expires_in`.
    /// Default: 1 hour
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// How long a staged authorization request waits for the end-user's
    /// decision.
    /// Default: 5 minutes
    #[serde(with = "humantime_serde")]
    pub pending_authorization_timeout: Duration,

    /// Issue refresh tokens from the grants that support them.
    /// Default: true
    pub issue_refresh_tokens: bool,

    /// Where unauthenticated end-users are sent during the interactive flow.
    pub login_path: String,

    /// Where staged requests are sent to render the consent screen.
    pub consent_path: String,

    /// Browser session settings.
    pub session: SessionConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(300),
            access_token_lifetime: Duration::from_secs(3600),
            pending_authorization_timeout: Duration::from_secs(300),
            issue_refresh_tokens: true,
            login_path: "/login".to_string(),
            consent_path: "/consent".to_string(),
            session: SessionConfig::default(),
        }
    }
}

/// Browser session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the signed session cookie.
    /// Default: "parley_session"
    pub cookie_name: String,

    /// Set the `Secure` attribute on the cookie.
    /// Default: false
    pub secure_cookies: bool,

    /// Lifetime of the session and of values stored in it.
    /// Default: 7 days
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "parley_session".to_string(),
            secure_cookies: false,
            ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl OAuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a lifetime is zero or a path is
    /// not absolute, and `ConfigError::Missing` if the cookie name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("authorization_code_lifetime", self.authorization_code_lifetime),
            ("access_token_lifetime", self.access_token_lifetime),
            ("pending_authorization_timeout", self.pending_authorization_timeout),
            ("session.ttl", self.session.ttl),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue(format!("{name} must be > 0")));
            }
        }

        for (name, value) in [
            ("login_path", &self.login_path),
            ("consent_path", &self.consent_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be an absolute path, got '{value}'"
                )));
            }
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Missing("session.cookie_name".to_string()));
        }

        Ok(())
    }

    /// Authorization code lifetime as a `time` duration.
    #[must_use]
    pub fn code_lifetime(&self) -> time::Duration {
        to_time(self.authorization_code_lifetime)
    }

    /// Access token lifetime as a `time` duration.
    #[must_use]
    pub fn access_lifetime(&self) -> time::Duration {
        to_time(self.access_token_lifetime)
    }

    /// Pending authorization timeout as a `time` duration.
    #[must_use]
    pub fn pending_timeout(&self) -> time::Duration {
        to_time(self.pending_authorization_timeout)
    }
}

fn to_time(duration: Duration) -> time::Duration {
    time::Duration::try_from(duration).unwrap_or(time::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OAuthConfig::default();
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(300));
        assert_eq!(config.pending_timeout(), time::Duration::minutes(5));
        assert!(config.issue_refresh_tokens);
        assert_eq!(config.login_path, "/login");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: OAuthConfig = serde_json::from_str(
            r#"{"access_token_lifetime": "15m", "session": {"ttl": "1day"}}"#,
        )
        .unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.session.ttl, Duration::from_secs(86_400));
        assert_eq!(config.session.cookie_name, "parley_session");
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(300));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = OAuthConfig {
            access_token_lifetime: Duration::ZERO,
            ..OAuthConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let config = OAuthConfig {
            login_path: "login".into(),
            ..OAuthConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = OAuthConfig::default();
        config.session.cookie_name.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing("session.cookie_name".into()))
        );
    }
}
