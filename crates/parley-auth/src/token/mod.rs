//! Token generation.
//!
//! - [`generate_secret`] draws the opaque values used for codes, tokens and
//!   client secrets
//! - [`TokenService`] mints and persists token rows

pub mod service;

pub use service::{TokenConfig, TokenService};

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of every generated code, token and client secret.
pub const SECRET_LENGTH: usize = 36;

/// Draws a random alphanumeric value from a cryptographically secure source.
#[must_use]
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), SECRET_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
