//! Storage traits

use async_trait::async_trait;

use crate::auth::errors::StoreError;
use crate::auth::types::{NewRefreshToken, NewUser, RefreshToken, User};

/// Credential store
///
/// Email uniqueness must be enforced here; a duplicate insert fails with
/// [`StoreError::AlreadyExists`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user and assign its id
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by id
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
}

/// Refresh-token store; the source of truth for refresh-token validity
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist an issued refresh token and assign its id
    async fn create_token(&self, token: NewRefreshToken) -> Result<RefreshToken, StoreError>;

    /// Look up a refresh token by its exact string
    async fn get_by_token(&self, token: &str) -> Result<RefreshToken, StoreError>;

    /// Revoke a refresh token; `NotFound` if it was not stored
    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError>;

    /// Delete every token with `expires_at <= now`, returning how many went
    async fn delete_expired(&self, now: i64) -> Result<u64, StoreError>;
}
