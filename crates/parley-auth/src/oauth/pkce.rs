//! PKCE (Proof Key for Code Exchange) support.
//!
//! Implements RFC 7636 with both the `plain` and `S256` methods. The method
//! is checked when the challenge is accepted at the authorization endpoint;
//! verification at the token endpoint is a pure comparison.
//!
//! # Example
//!
//! ```
//! use parley_auth::oauth::pkce::{self, PkceMethod};
//!
//! let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
//! let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
//! assert!(pkce::verify(PkceMethod::S256, challenge, verifier));
//! ```

use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Unreserved characters, 43 to 128 of them (RFC 7636 section 4.1).
static PKCE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-._~]{43,128}$").expect("valid PKCE regex"));

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while accepting a PKCE challenge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkceError {
    /// The challenge method is neither `plain` nor `S256`.
    #[error("Unsupported code_challenge_method: {0}")]
    UnsupportedMethod(String),

    /// The challenge is not 43-128 unreserved characters.
    #[error("Malformed code_challenge")]
    MalformedChallenge,
}

// =============================================================================
// Challenge Method
// =============================================================================

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum PkceMethod {
    /// The challenge is the verifier itself. Used when no method was sent.
    #[default]
    #[serde(rename = "plain")]
    Plain,
    /// The challenge is `BASE64URL(SHA256(verifier))`.
    S256,
}

impl PkceMethod {
    /// Parses a `code_challenge_method` value.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything other than
    /// `plain` or `S256`.
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            other => Err(PkceError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Get the method as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Code Challenge
// =============================================================================

/// A challenge accepted at the authorization endpoint, stored with the code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CodeChallenge {
    /// The `code_challenge` value.
    pub challenge: String,
    /// How the verifier is transformed before comparison.
    pub method: PkceMethod,
}

impl CodeChallenge {
    /// Verifies a `code_verifier` against this challenge.
    #[must_use]
    pub fn verify(&self, verifier: &str) -> bool {
        verify(self.method, &self.challenge, verifier)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Returns `true` if `value` is a well-formed challenge or verifier.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    PKCE_VALUE.is_match(value)
}

/// Accepts the PKCE parameters of an authorization request.
///
/// Returns `Ok(None)` when the request carries no PKCE at all. A challenge
/// sent without a method is stored as `plain`.
///
/// # Errors
///
/// Returns an error if the method is unknown or the challenge is malformed.
pub fn accept_challenge(challenge: &str, method: &str) -> Result<Option<CodeChallenge>, PkceError> {
    if challenge.is_empty() && method.is_empty() {
        return Ok(None);
    }

    let method = if method.is_empty() {
        PkceMethod::Plain
    } else {
        PkceMethod::parse(method)?
    };

    if !is_well_formed(challenge) {
        return Err(PkceError::MalformedChallenge);
    }

    Ok(Some(CodeChallenge {
        challenge: challenge.to_string(),
        method,
    }))
}

/// Computes the `S256` challenge for a verifier.
#[must_use]
pub fn s256_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Verifies a code verifier against a stored challenge.
///
/// A verifier that is not 43-128 unreserved characters never verifies.
#[must_use]
pub fn verify(method: PkceMethod, challenge: &str, verifier: &str) -> bool {
    if !is_well_formed(verifier) {
        return false;
    }

    match method {
        PkceMethod::Plain => verifier == challenge,
        PkceMethod::S256 => s256_challenge(verifier) == challenge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7636 Appendix B
    const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const RFC_CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    // -------------------------------------------------------------------------
    // Method parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_method_parse() {
        assert_eq!(PkceMethod::parse("plain").unwrap(), PkceMethod::Plain);
        assert_eq!(PkceMethod::parse("S256").unwrap(), PkceMethod::S256);
        assert!(matches!(
            PkceMethod::parse("s256"),
            Err(PkceError::UnsupportedMethod(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    #[test]
    fn test_s256_rfc_vector() {
        assert_eq!(s256_challenge(RFC_VERIFIER), RFC_CHALLENGE);
        assert!(verify(PkceMethod::S256, RFC_CHALLENGE, RFC_VERIFIER));
    }

    #[test]
    fn test_s256_mismatch() {
        let other = "aBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert!(!verify(PkceMethod::S256, RFC_CHALLENGE, other));
    }

    #[test]
    fn test_plain() {
        assert!(verify(PkceMethod::Plain, RFC_VERIFIER, RFC_VERIFIER));
        assert!(!verify(PkceMethod::Plain, RFC_CHALLENGE, RFC_VERIFIER));
    }

    #[test]
    fn test_wrong_method_fails() {
        // S256 challenge checked as plain
        assert!(!verify(PkceMethod::Plain, RFC_CHALLENGE, RFC_VERIFIER));
        // plain challenge checked as S256
        assert!(!verify(PkceMethod::S256, RFC_VERIFIER, RFC_VERIFIER));
    }

    #[test]
    fn test_malformed_verifier_never_verifies() {
        let short = "abc";
        assert!(!verify(PkceMethod::Plain, short, short));

        let bad_chars = "dBjftJeZ4CVP+mB92K27uhbUJU1p1r/wW1gFWFOEjXk";
        assert!(!verify(PkceMethod::Plain, bad_chars, bad_chars));

        let too_long = "a".repeat(129);
        assert!(!verify(PkceMethod::Plain, &too_long, &too_long));
    }

    // -------------------------------------------------------------------------
    // Challenge acceptance
    // -------------------------------------------------------------------------

    #[test]
    fn test_accept_challenge() {
        assert_eq!(accept_challenge("", "").unwrap(), None);

        let accepted = accept_challenge(RFC_CHALLENGE, "S256").unwrap().unwrap();
        assert_eq!(accepted.challenge, RFC_CHALLENGE);
        assert_eq!(accepted.method, PkceMethod::S256);
        assert!(accepted.verify(RFC_VERIFIER));

        let accepted = accept_challenge(RFC_VERIFIER, "").unwrap().unwrap();
        assert_eq!(accepted.method, PkceMethod::Plain);
        assert!(accepted.verify(RFC_VERIFIER));
    }

    #[test]
    fn test_accept_challenge_rejects() {
        assert!(matches!(
            accept_challenge(RFC_CHALLENGE, "S512"),
            Err(PkceError::UnsupportedMethod(_))
        ));
        assert_eq!(
            accept_challenge("short", "S256"),
            Err(PkceError::MalformedChallenge)
        );
        assert_eq!(
            accept_challenge("", "plain"),
            Err(PkceError::MalformedChallenge)
        );
    }
}
