//! End-user directory.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use parley_auth::storage::UserDirectory;
use parley_auth::types::User;
use parley_auth::{AuthError, AuthResult};

use crate::password::{hash_password, verify_password};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Users with Argon2id password hashes.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    by_id: DashMap<String, StoredUser>,
    names: DashMap<String, String>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the name is taken, or an internal
    /// error if hashing fails.
    pub fn add_user(&self, name: &str, password: &str) -> AuthResult<User> {
        let password_hash = hash_password(password)
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };

        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => {
                return Err(AuthError::conflict(format!("user name {name} is taken")));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }

        self.by_id.insert(
            user.id.clone(),
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no user is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<User>> {
        let Some(id) = self.names.get(name).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|entry| entry.user.clone()))
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        Ok(self.by_id.get(id).map(|entry| entry.user.clone()))
    }

    async fn verify_password(&self, user: &User, password: &str) -> AuthResult<bool> {
        let Some(hash) = self.by_id.get(&user.id).map(|entry| entry.password_hash.clone()) else {
            return Ok(false);
        };
        verify_password(password, &hash)
            .map_err(|e| AuthError::internal(format!("stored password hash is invalid: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_find() {
        let users = MemoryUserDirectory::new();
        let alice = users.add_user("alice", "wonderland").unwrap();

        assert_eq!(users.find_by_name("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(users.find_by_id(&alice.id).await.unwrap(), Some(alice));
        assert!(users.find_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_password() {
        let users = MemoryUserDirectory::new();
        let alice = users.add_user("alice", "wonderland").unwrap();

        assert!(users.verify_password(&alice, "wonderland").await.unwrap());
        assert!(!users.verify_password(&alice, "looking-glass").await.unwrap());

        let ghost = User {
            id: "ghost".into(),
            name: "ghost".into(),
        };
        assert!(!users.verify_password(&ghost, "anything").await.unwrap());
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let users = MemoryUserDirectory::new();
        users.add_user("alice", "one").unwrap();
        assert!(users.add_user("alice", "two").unwrap_err().is_conflict());
        assert_eq!(users.len(), 1);
    }
}
