//! Browser session values.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use parley_auth::AuthResult;
use parley_auth::storage::SessionStore;

#[derive(Debug, Clone)]
struct SessionValue {
    value: String,
    /// `None` when the TTL does not fit in an `Instant`.
    expires_at: Option<Instant>,
}

impl SessionValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Session values keyed by `(session id, key)`. Expired values are
/// dropped when they are next read.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: DashMap<(String, String), SessionValue>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired value. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.values.len();
        self.values.retain(|_, value| value.is_live(now));
        before.saturating_sub(self.values.len())
    }

    fn key(session_id: &str, key: &str) -> (String, String) {
        (session_id.to_string(), key.to_string())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> AuthResult<Option<String>> {
        let key = Self::key(session_id, key);
        let now = Instant::now();
        let removed = self.values.remove_if(&key, |_, value| !value.is_live(now));
        if removed.is_some() {
            return Ok(None);
        }
        Ok(self.values.get(&key).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        session_id: &str,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> AuthResult<()> {
        self.values.insert(
            Self::key(session_id, key),
            SessionValue {
                value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn take(&self, session_id: &str, key: &str) -> AuthResult<Option<String>> {
        let now = Instant::now();
        Ok(self
            .values
            .remove(&Self::key(session_id, key))
            .map(|(_, value)| value)
            .filter(|value| value.is_live(now))
            .map(|value| value.value))
    }

    async fn remove(&self, session_id: &str, key: &str) -> AuthResult<()> {
        self.values.remove(&Self::key(session_id, key));
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> AuthResult<()> {
        self.values.retain(|(id, _), _| id != session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_set_get_take() {
        let store = MemorySessionStore::new();
        store.set("s1", "k", "v".into(), HOUR).await.unwrap();

        assert_eq!(store.get("s1", "k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("s2", "k").await.unwrap(), None);
        assert_eq!(store.take("s1", "k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.take("s1", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_values_are_absent() {
        let store = MemorySessionStore::new();
        store.set("s1", "k", "v".into(), Duration::ZERO).await.unwrap();
        store.set("s1", "other", "v".into(), Duration::ZERO).await.unwrap();

        assert_eq!(store.get("s1", "k").await.unwrap(), None);
        assert_eq!(store.take("s1", "k").await.unwrap(), None);
        assert_eq!(store.purge_expired(), 1);
    }

    #[tokio::test]
    async fn test_destroy_only_touches_one_session() {
        let store = MemorySessionStore::new();
        store.set("s1", "a", "1".into(), HOUR).await.unwrap();
        store.set("s1", "b", "2".into(), HOUR).await.unwrap();
        store.set("s2", "a", "3".into(), HOUR).await.unwrap();

        store.destroy("s1").await.unwrap();
        assert_eq!(store.get("s1", "a").await.unwrap(), None);
        assert_eq!(store.get("s1", "b").await.unwrap(), None);
        assert_eq!(store.get("s2", "a").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemorySessionStore::new();
        store.set("s1", "a", "1".into(), HOUR).await.unwrap();
        store.remove("s1", "a").await.unwrap();
        store.remove("s1", "missing").await.unwrap();
        assert_eq!(store.get("s1", "a").await.unwrap(), None);
    }
}
