//! Silent consent for `prompt=none`.
//!
//! A `prompt=none` request can skip the decide step only if the end-user
//! already holds a token for the same client whose scopes cover what is
//! being asked for now.

use std::sync::Arc;

use crate::AuthResult;
use crate::scope::ScopeSet;
use crate::storage::TokenStorage;

/// Decides whether a (client, user) pair has already consented to a scope set.
pub struct ConsentEvaluator {
    tokens: Arc<dyn TokenStorage>,
}

impl ConsentEvaluator {
    /// Creates an evaluator backed by the token store.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStorage>) -> Self {
        Self { tokens }
    }

    /// Returns `true` if one of the user's tokens for `client_id` carries
    /// every scope in `scopes`.
    ///
    /// Token expiry is not considered; an issued token records consent
    /// until it is revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn has_consent(
        &self,
        client_id: &str,
        user_id: &str,
        scopes: &ScopeSet,
    ) -> AuthResult<bool> {
        let tokens = self.tokens.list_by_user(user_id).await?;
        Ok(tokens
            .iter()
            .any(|token| token.client_id == client_id && scopes.is_subset(&token.scopes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use time::OffsetDateTime;
    use tokio_test::block_on;

    use crate::types::Token;

    /// Token storage that only answers `list_by_user`.
    struct FixedTokens(Vec<Token>);

    #[async_trait]
    impl TokenStorage for FixedTokens {
        async fn create(&self, _token: &Token) -> AuthResult<()> {
            Ok(())
        }
        async fn find_by_access(&self, _access_token: &str) -> AuthResult<Option<Token>> {
            Ok(None)
        }
        async fn find_by_refresh(&self, _refresh_token: &str) -> AuthResult<Option<Token>> {
            Ok(None)
        }
        async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<Token>> {
            Ok(self
                .0
                .iter()
                .filter(|t| t.user_id.as_deref() == Some(user_id))
                .cloned()
                .collect())
        }
        async fn take_by_refresh(&self, _refresh_token: &str) -> AuthResult<Option<Token>> {
            Ok(None)
        }
        async fn delete_by_access(&self, _access_token: &str) -> AuthResult<bool> {
            Ok(false)
        }
        async fn delete_by_refresh(&self, _refresh_token: &str) -> AuthResult<bool> {
            Ok(false)
        }
        async fn delete_by_id(&self, _id: &str) -> AuthResult<bool> {
            Ok(false)
        }
    }

    fn token(client_id: &str, user_id: &str, scopes: &str, expires_in: i64) -> Token {
        Token {
            id: format!("{client_id}-{user_id}"),
            client_id: client_id.into(),
            user_id: Some(user_id.into()),
            access_token: "a".into(),
            refresh_token: None,
            redirect_uri: String::new(),
            scopes: ScopeSet::parse(scopes),
            created_at: OffsetDateTime::now_utc(),
            expires_in,
        }
    }

    fn evaluator(tokens: Vec<Token>) -> ConsentEvaluator {
        ConsentEvaluator::new(Arc::new(FixedTokens(tokens)))
    }

    #[test]
    fn test_covering_token_counts_as_consent() {
        let consent = evaluator(vec![token("app", "alice", "read write", 3600)]);
        block_on(async {
            assert!(consent.has_consent("app", "alice", &ScopeSet::parse("read")).await.unwrap());
            assert!(consent.has_consent("app", "alice", &ScopeSet::parse("read write")).await.unwrap());
        });
    }

    #[test]
    fn test_wider_request_needs_consent() {
        let consent = evaluator(vec![token("app", "alice", "read", 3600)]);
        block_on(async {
            let wider = ScopeSet::parse("read manage_bot");
            assert!(!consent.has_consent("app", "alice", &wider).await.unwrap());
        });
    }

    #[test]
    fn test_other_client_or_user_does_not_count() {
        let consent = evaluator(vec![token("other-app", "alice", "read", 3600)]);
        block_on(async {
            let read = ScopeSet::parse("read");
            assert!(!consent.has_consent("app", "alice", &read).await.unwrap());
            assert!(!consent.has_consent("other-app", "bob", &read).await.unwrap());
        });
    }

    #[test]
    fn test_expired_token_still_records_consent() {
        let consent = evaluator(vec![token("app", "alice", "read", -60)]);
        block_on(async {
            assert!(consent.has_consent("app", "alice", &ScopeSet::parse("read")).await.unwrap());
        });
    }
}
