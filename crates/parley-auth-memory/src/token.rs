//! Token rows with access, refresh and id indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use parley_auth::storage::TokenStorage;
use parley_auth::types::Token;
use parley_auth::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct TokenTable {
    by_id: HashMap<String, Token>,
    by_access: HashMap<String, String>,
    by_refresh: HashMap<String, String>,
}

impl TokenTable {
    fn holds_value(&self, value: &str) -> bool {
        self.by_access.contains_key(value) || self.by_refresh.contains_key(value)
    }

    fn remove_id(&mut self, id: &str) -> Option<Token> {
        let token = self.by_id.remove(id)?;
        self.by_access.remove(&token.access_token);
        if let Some(refresh) = &token.refresh_token {
            self.by_refresh.remove(refresh);
        }
        Some(token)
    }
}

/// Token rows.
///
/// All three indexes live under one lock, so a row is either visible
/// through every index or through none.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    table: RwLock<TokenTable>,
}

impl MemoryTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_id.len()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn create(&self, token: &Token) -> AuthResult<()> {
        let mut table = self.table.write().await;

        if table.by_id.contains_key(&token.id) {
            return Err(AuthError::conflict("token id already exists"));
        }
        // Revocation matches either field, so values are unique across both.
        if table.holds_value(&token.access_token) {
            return Err(AuthError::conflict("access token already exists"));
        }
        if let Some(refresh) = &token.refresh_token
            && (refresh == &token.access_token || table.holds_value(refresh))
        {
            return Err(AuthError::conflict("refresh token already exists"));
        }

        table
            .by_access
            .insert(token.access_token.clone(), token.id.clone());
        if let Some(refresh) = &token.refresh_token {
            table.by_refresh.insert(refresh.clone(), token.id.clone());
        }
        table.by_id.insert(token.id.clone(), token.clone());
        Ok(())
    }

    async fn find_by_access(&self, access_token: &str) -> AuthResult<Option<Token>> {
        let table = self.table.read().await;
        Ok(table
            .by_access
            .get(access_token)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_refresh(&self, refresh_token: &str) -> AuthResult<Option<Token>> {
        let table = self.table.read().await;
        Ok(table
            .by_refresh
            .get(refresh_token)
            .and_then(|id| table.by_id.get(id))
            .filter(|token| token.refresh_enabled())
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<Token>> {
        let table = self.table.read().await;
        let mut tokens: Vec<Token> = table
            .by_id
            .values()
            .filter(|token| token.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tokens)
    }

    async fn take_by_refresh(&self, refresh_token: &str) -> AuthResult<Option<Token>> {
        let mut table = self.table.write().await;
        let Some(id) = table.by_refresh.get(refresh_token).cloned() else {
            return Ok(None);
        };
        Ok(table.remove_id(&id))
    }

    async fn delete_by_access(&self, access_token: &str) -> AuthResult<bool> {
        let mut table = self.table.write().await;
        let Some(id) = table.by_access.get(access_token).cloned() else {
            return Ok(false);
        };
        Ok(table.remove_id(&id).is_some())
    }

    async fn delete_by_refresh(&self, refresh_token: &str) -> AuthResult<bool> {
        let mut table = self.table.write().await;
        let Some(id) = table.by_refresh.get(refresh_token).cloned() else {
            return Ok(false);
        };
        Ok(table.remove_id(&id).is_some())
    }

    async fn delete_by_id(&self, id: &str) -> AuthResult<bool> {
        Ok(self.table.write().await.remove_id(id).is_some())
    }
}
