//! Client registrations.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use parley_auth::storage::ClientStorage;
use parley_auth::types::Client;
use parley_auth::{AuthError, AuthResult};

/// Clients keyed by id.
#[derive(Debug, Default)]
pub struct MemoryClientStorage {
    clients: DashMap<String, Client>,
}

impl MemoryClientStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStorage for MemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, client: &Client) -> AuthResult<Client> {
        match self.clients.entry(client.id.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict(format!(
                "client {} already exists",
                client.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(client.clone());
                Ok(client.clone())
            }
        }
    }

    async fn list_by_creator(&self, creator_id: &str) -> AuthResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .clients
            .iter()
            .filter(|entry| entry.creator_id == creator_id)
            .map(|entry| entry.value().clone())
            .collect();
        clients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(clients)
    }

    async fn update(&self, client: &Client) -> AuthResult<Client> {
        match self.clients.get_mut(&client.id) {
            Some(mut entry) => {
                *entry = client.clone();
                Ok(client.clone())
            }
            None => Err(AuthError::not_found(format!("client {}", client.id))),
        }
    }

    async fn delete(&self, client_id: &str) -> AuthResult<()> {
        self.clients
            .remove(client_id)
            .map(|_| ())
            .ok_or_else(|| AuthError::not_found(format!("client {client_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_auth::ScopeSet;

    fn client(id: &str, creator: &str) -> Client {
        Client::new(format!("{id} app"), creator)
            .with_id(id)
            .with_redirect_uri("https://app.example.com/cb")
            .with_scopes(ScopeSet::parse("read write"))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryClientStorage::new();
        store.create(&client("app-1", "alice")).await.unwrap();

        let found = store.find_by_client_id("app-1").await.unwrap().unwrap();
        assert_eq!(found.name, "app-1 app");
        assert!(store.find_by_client_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let store = MemoryClientStorage::new();
        store.create(&client("app-1", "alice")).await.unwrap();
        let err = store.create(&client("app-1", "bob")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_creator() {
        let store = MemoryClientStorage::new();
        store.create(&client("a", "alice")).await.unwrap();
        store.create(&client("b", "bob")).await.unwrap();
        store.create(&client("c", "alice")).await.unwrap();

        let ids: Vec<String> = store
            .list_by_creator("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a".to_string()));
        assert!(ids.contains(&"c".to_string()));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryClientStorage::new();
        let original = store.create(&client("app-1", "alice")).await.unwrap();

        let updated = original.clone().confidential(true);
        store.update(&updated).await.unwrap();
        assert!(store.find_by_client_id("app-1").await.unwrap().unwrap().confidential);

        store.delete("app-1").await.unwrap();
        assert!(store.is_empty());
        assert!(store.delete("app-1").await.unwrap_err().is_not_found());
        assert!(store.update(&updated).await.unwrap_err().is_not_found());
    }
}
