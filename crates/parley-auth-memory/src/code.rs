//! Authorization codes.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use tracing::debug;

use parley_auth::storage::AuthorizationCodeStorage;
use parley_auth::types::AuthorizationCode;
use parley_auth::{AuthError, AuthResult};

/// Codes keyed by value. `take` is a single map removal, so only one
/// caller can ever receive a given code.
#[derive(Debug, Default)]
pub struct MemoryCodeStorage {
    codes: DashMap<String, AuthorizationCode>,
}

impl MemoryCodeStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if no code is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for MemoryCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        match self.codes.entry(code.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict("authorization code already exists")),
            Entry::Vacant(slot) => {
                slot.insert(code.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.get(code).map(|entry| entry.value().clone()))
    }

    async fn take(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.remove(code).map(|(_, value)| value))
    }

    async fn delete(&self, code: &str) -> AuthResult<bool> {
        Ok(self.codes.remove(code).is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let before = self.codes.len();
        self.codes.retain(|_, code| !code.is_expired_at(now));
        let removed = before.saturating_sub(self.codes.len()) as u64;
        if removed > 0 {
            debug!(removed, "Removed expired authorization codes");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parley_auth::ScopeSet;

    fn code(value: &str, expires_in: i64) -> AuthorizationCode {
        AuthorizationCode {
            code: value.to_string(),
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

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryCodeStorage::new();
        store.create(&code("abc", 300)).await.unwrap();

        assert!(store.find("abc").await.unwrap().is_some());
        assert!(store.take("abc").await.unwrap().is_some());
        assert!(store.take("abc").await.unwrap().is_none());
        assert!(store.find("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let store = MemoryCodeStorage::new();
        store.create(&code("abc", 300)).await.unwrap();
        assert!(store.create(&code("abc", 300)).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryCodeStorage::new();
        store.create(&code("abc", 300)).await.unwrap();
        assert!(store.delete("abc").await.unwrap());
        assert!(!store.delete("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let store = MemoryCodeStorage::new();
        store.create(&code("live", 300)).await.unwrap();
        store.create(&code("dead-1", -1)).await.unwrap();
        store.create(&code("dead-2", -60)).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.find("live").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_take_has_one_winner() {
        let store = Arc::new(MemoryCodeStorage::new());
        store.create(&code("contested", 300)).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take("contested").await.unwrap().is_some() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
