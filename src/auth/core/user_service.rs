//! User management service

use std::sync::Arc;
use tracing::info;

use crate::auth::{
    errors::AuthError,
    storage::UserStore,
    types::{NewUser, User},
};

/// User management service over the credential store
#[derive(Clone)]
pub struct UserService {
    storage: Arc<dyn UserStore>,
}

impl UserService {
    /// Create a new user service
    pub fn new(storage: Arc<dyn UserStore>) -> Self {
        Self { storage }
    }

    /// Create a user from an already-hashed password.
    ///
    /// Lookup-then-insert is not atomic; a concurrent duplicate is caught by the
    /// store's uniqueness constraint and surfaces as the same `AlreadyExists`.
    pub async fn create_user(&self, email: &str, password_hash: String) -> Result<User, AuthError> {
        if self.storage.find_by_email(email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let user = self
            .storage
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.storage.find_by_email(email).await?)
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        Ok(self.storage.find_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;

    #[tokio::test]
    async fn test_create_user() {
        let service = UserService::new(Arc::new(MemoryStorage::new()));

        let user = service
            .create_user("test@example.com", "hashed_password".to_string())
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.email, "test@example.com");
        assert_eq!(service.find_by_id(1).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let service = UserService::new(Arc::new(MemoryStorage::new()));

        service
            .create_user("test@example.com", "hash1".to_string())
            .await
            .unwrap();

        let result = service
            .create_user("test@example.com", "hash2".to_string())
            .await;

        assert!(matches!(result, Err(AuthError::AlreadyExists)));
    }
}
