//! `response_type` decoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single response type an authorization request asks for.
///
/// Combinations such as `code token` or `none code` are not representable;
/// they are rejected while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Authorization code flow.
    Code,
    /// Implicit flow. Recognised but never served.
    Token,
    /// No credential is returned. Recognised but never served.
    None,
}

/// Why a `response_type` value could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseTypeError {
    /// A token other than `code`, `token` or `none` was present.
    #[error("unknown response type: {0}")]
    Unknown(String),

    /// Zero or several response types were requested.
    #[error("exactly one response type must be requested")]
    NotExactlyOne,
}

impl ResponseType {
    /// Decodes a space-separated `response_type` value.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value names exactly one known type
    /// (repeating the same type is tolerated).
    pub fn parse(raw: &str) -> Result<Self, ResponseTypeError> {
        let mut found: Option<Self> = None;

        for token in raw.split_whitespace() {
            let parsed = match token {
                "code" => Self::Code,
                "token" => Self::Token,
                "none" => Self::None,
                other => return Err(ResponseTypeError::Unknown(other.to_string())),
            };

            match found {
                Some(existing) if existing != parsed => {
                    return Err(ResponseTypeError::NotExactlyOne);
                }
                _ => found = Some(parsed),
            }
        }

        found.ok_or(ResponseTypeError::NotExactlyOne)
    }

    /// Get the response type as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_types() {
        assert_eq!(ResponseType::parse("code").unwrap(), ResponseType::Code);
        assert_eq!(ResponseType::parse("token").unwrap(), ResponseType::Token);
        assert_eq!(ResponseType::parse(" none ").unwrap(), ResponseType::None);
        assert_eq!(ResponseType::parse("code code").unwrap(), ResponseType::Code);
    }

    #[test]
    fn test_combinations_rejected() {
        assert_eq!(
            ResponseType::parse("code token"),
            Err(ResponseTypeError::NotExactlyOne)
        );
        assert_eq!(
            ResponseType::parse("none code"),
            Err(ResponseTypeError::NotExactlyOne)
        );
        assert_eq!(ResponseType::parse(""), Err(ResponseTypeError::NotExactlyOne));
    }

    #[test]
    fn test_unknown_rejected() {
        assert_eq!(
            ResponseType::parse("code id_token"),
            Err(ResponseTypeError::Unknown("id_token".to_string()))
        );
    }
}
