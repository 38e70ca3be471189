//! In-memory storage (development and tests)

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::r#trait::{RefreshTokenStore, UserStore};
use crate::auth::errors::StoreError;
use crate::auth::types::{NewRefreshToken, NewUser, RefreshToken, User};

#[derive(Default)]
struct UserTable {
    /// id -> User
    by_id: BTreeMap<i64, User>,
    /// email -> id
    by_email: HashMap<String, i64>,
    last_id: i64,
}

#[derive(Default)]
struct TokenTable {
    /// token string -> record
    by_token: HashMap<String, RefreshToken>,
    last_id: i64,
}

/// In-memory storage. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    users: Arc<RwLock<UserTable>>,
    tokens: Arc<RwLock<TokenTable>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored refresh tokens
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.by_token.len()
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.by_email.contains_key(&user.email) {
            return Err(StoreError::AlreadyExists);
        }

        users.last_id += 1;
        let user = User {
            id: users.last_id,
            email: user.email,
            password_hash: user.password_hash,
            height: None,
            weight: None,
            goal: None,
            created_at: Utc::now().timestamp(),
        };

        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        debug!(user_id = user.id, "user saved to memory storage");

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStorage {
    async fn create_token(&self, token: NewRefreshToken) -> Result<RefreshToken, StoreError> {
        // same guarantee as the foreign key in SQL
        if !self.users.read().await.by_id.contains_key(&token.user_id) {
            return Err(StoreError::UnknownUser(token.user_id));
        }

        let mut tokens = self.tokens.write().await;
        if tokens.by_token.contains_key(&token.token) {
            return Err(StoreError::AlreadyExists);
        }

        tokens.last_id += 1;
        let record = RefreshToken {
            id: tokens.last_id,
            user_id: token.user_id,
            token: token.token,
            expires_at: token.expires_at,
            created_at: Utc::now().timestamp(),
        };
        tokens.by_token.insert(record.token.clone(), record.clone());

        Ok(record)
    }

    async fn get_by_token(&self, token: &str) -> Result<RefreshToken, StoreError> {
        self.tokens
            .read()
            .await
            .by_token
            .get(token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
        self.tokens
            .write()
            .await
            .by_token
            .remove(token)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn delete_expired(&self, now: i64) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.by_token.len();
        tokens.by_token.retain(|_, record| record.expires_at > now);
        Ok((before - tokens.by_token.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
        }
    }

    fn new_token(user_id: i64, token: &str, expires_at: i64) -> NewRefreshToken {
        NewRefreshToken {
            user_id,
            token: token.to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_memory_storage_users() {
        let storage = MemoryStorage::new();

        let alice = storage.create_user(new_user("alice@example.com")).await.unwrap();
        let bob = storage.create_user(new_user("bob@example.com")).await.unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);

        let found = storage.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(storage.find_by_id(2).await.unwrap().unwrap().email, "bob@example.com");

        // case-sensitive, exact match only
        assert!(storage.find_by_email("Alice@example.com").await.unwrap().is_none());
        assert!(storage.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("alice@example.com")).await.unwrap();

        let result = storage.create_user(new_user("alice@example.com")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let storage = MemoryStorage::new();
        let user = storage.create_user(new_user("alice@example.com")).await.unwrap();

        let record = storage.create_token(new_token(user.id, "tok-1", 2_000)).await.unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.user_id, user.id);

        assert_eq!(storage.get_by_token("tok-1").await.unwrap(), record);

        storage.delete_by_token("tok-1").await.unwrap();
        assert!(matches!(storage.get_by_token("tok-1").await, Err(StoreError::NotFound)));
        assert!(matches!(storage.delete_by_token("tok-1").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_token_requires_known_user() {
        let storage = MemoryStorage::new();
        let result = storage.create_token(new_token(5, "tok", 2_000)).await;
        assert!(matches!(result, Err(StoreError::UnknownUser(5))));
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("alice@example.com")).await.unwrap();
        storage.create_token(new_token(1, "tok", 2_000)).await.unwrap();

        let result = storage.create_token(new_token(1, "tok", 2_000)).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("alice@example.com")).await.unwrap();
        storage.create_token(new_token(1, "old", 1_000)).await.unwrap();
        storage.create_token(new_token(1, "edge", 1_500)).await.unwrap();
        storage.create_token(new_token(1, "fresh", 2_000)).await.unwrap();

        assert_eq!(storage.delete_expired(1_500).await.unwrap(), 2);
        assert_eq!(storage.token_count().await, 1);
        assert!(storage.get_by_token("fresh").await.is_ok());

        assert_eq!(storage.delete_expired(1_500).await.unwrap(), 0);
    }
}
