//! Access scopes.
//!
//! A [`ScopeSet`] is an immutable, ordered set of known [`Scope`]s. Parsing
//! silently drops tokens that are not known scopes; callers decide whether
//! the resulting (possibly empty) set is acceptable.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A capability a token may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// `openid`
    OpenId,
    /// `profile`
    Profile,
    /// `read`
    Read,
    /// `write`
    Write,
    /// `manage_bot`
    ManageBot,
}

impl Scope {
    /// Every known scope, in canonical order.
    pub const ALL: [Scope; 5] = [
        Scope::OpenId,
        Scope::Profile,
        Scope::Read,
        Scope::Write,
        Scope::ManageBot,
    ];

    /// Parses a single scope token. Returns `None` for unknown tokens.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "openid" => Some(Self::OpenId),
            "profile" => Some(Self::Profile),
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "manage_bot" => Some(Self::ManageBot),
            _ => None,
        }
    }

    /// Returns the wire name of the scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenId => "openid",
            Self::Profile => "profile",
            Self::Read => "read",
            Self::Write => "write",
            Self::ManageBot => "manage_bot",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable set of scopes.
///
/// Serialized as a single space-separated string in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a space-separated scope string, dropping unknown tokens.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split_whitespace().filter_map(Scope::parse).collect()
    }

    /// Returns the scopes present in both sets.
    #[must_use]
    pub fn intersect(&self, other: &ScopeSet) -> ScopeSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// Returns `true` if every scope in `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &ScopeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns `true` if the set contains `scope`.
    #[must_use]
    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    /// Returns `true` if the set has no scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of scopes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the scopes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl From<String> for ScopeSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ScopeSet> for String {
    fn from(scopes: ScopeSet) -> Self {
        scopes.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_unknown_tokens() {
        let scopes = ScopeSet::parse("read  bogus write");
        assert_eq!(scopes.len(), 2);
        assert!(scopes.contains(Scope::Read));
        assert!(scopes.contains(Scope::Write));

        assert!(ScopeSet::parse("bogus nope").is_empty());
        assert!(ScopeSet::parse("").is_empty());
    }

    #[test]
    fn test_display_is_canonical_order() {
        let scopes = ScopeSet::parse("write manage_bot read openid");
        assert_eq!(scopes.to_string(), "openid read write manage_bot");
        assert_eq!(ScopeSet::parse("read read").to_string(), "read");
    }

    #[test]
    fn test_intersect_and_subset() {
        let client = ScopeSet::parse("read write");
        let requested = ScopeSet::parse("read manage_bot");

        let granted = requested.intersect(&client);
        assert_eq!(granted, ScopeSet::parse("read"));
        assert!(granted.is_subset(&client));
        assert!(!requested.is_subset(&client));
        assert!(ScopeSet::new().is_subset(&client));
    }

    #[test]
    fn test_serde_as_string() {
        let scopes = ScopeSet::parse("write read");
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, "\"read write\"");

        let back: ScopeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);
    }
}
