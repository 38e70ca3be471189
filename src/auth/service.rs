//! Authentication service (facade)
//!
//! Composes the credential store, refresh-token store, password hashing and
//! the token codec. Holds no mutable state of its own; every operation is at
//! most two store calls and never retries.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::auth::{
    config::AuthConfig,
    core::{password_service::MAX_PASSWORD_BYTES, Claims, PasswordService, TokenCodec, UserService},
    errors::{AuthError, StoreError},
    storage::{RefreshTokenStore, UserStore},
    types::{NewRefreshToken, RefreshToken, TokenPair, User},
};

/// Authentication service
pub struct AuthService {
    users: UserService,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    passwords: Arc<PasswordService>,
    codec: TokenCodec,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new authentication service
    ///
    /// # Errors
    /// `AuthError::Validation` if the signing secret is unusable
    pub fn new(
        user_store: Arc<dyn UserStore>,
        token_store: Arc<dyn RefreshTokenStore>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let codec = TokenCodec::new(&config.jwt_secret)?;
        let passwords = Arc::new(PasswordService::new(config.bcrypt_cost));

        Ok(Self {
            users: UserService::new(user_store),
            refresh_tokens: token_store,
            passwords,
            codec,
            config,
        })
    }

    /// Build over one backend that implements both stores
    pub fn with_storage<S>(storage: S, config: AuthConfig) -> Result<Self, AuthError>
    where
        S: UserStore + RefreshTokenStore + 'static,
    {
        let storage = Arc::new(storage);
        Self::new(storage.clone(), storage, config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new account
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let password_hash = self.hash_password(password).await?;
        self.users.create_user(email, password_hash).await
    }

    /// Check credentials.
    ///
    /// Unknown email and wrong password both give `InvalidCredentials` and
    /// cost one bcrypt verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.users.find_by_email(email).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password_valid = self.verify_password(stored_hash, password).await?;

        match user {
            Some(user) if password_valid => {
                info!(user_id = user.id, "login succeeded");
                Ok(user)
            }
            _ => {
                debug!("login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Issue an access and a refresh token for `user_id`.
    ///
    /// The refresh token is persisted before either token is returned.
    pub async fn generate_tokens(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();

        let access_token = self
            .codec
            .issue(user_id, now, now + self.config.access_ttl())?;

        let refresh_expires_at = now + self.config.refresh_ttl();
        let refresh_token = self.codec.issue(user_id, now, refresh_expires_at)?;

        self.persist_refresh_token(user_id, &refresh_token, refresh_expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Resolve an access token to its user id. Never touches storage.
    pub fn validate_token(&self, token: &str) -> Result<i64, AuthError> {
        self.codec
            .verify(token)
            .map(|claims| claims.sub)
            .map_err(AuthError::InvalidToken)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is left untouched.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        let (claims, _) = self.check_refresh_token(refresh_token).await?;

        let now = Utc::now().timestamp();
        let access_token = self
            .codec
            .issue(claims.sub, now, now + self.config.access_ttl())?;

        debug!(user_id = claims.sub, "access token refreshed");
        Ok(access_token)
    }

    /// Like [`refresh_access_token`](Self::refresh_access_token) but the presented
    /// refresh token is revoked and a new pair issued.
    pub async fn rotate_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let (claims, record) = self.check_refresh_token(refresh_token).await?;

        // a concurrent rotation of the same token loses here
        self.refresh_tokens.delete_by_token(&record.token).await?;

        debug!(user_id = claims.sub, "refresh token rotated");
        self.generate_tokens(claims.sub).await
    }

    /// Revoke a refresh token
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.delete_by_token(refresh_token).await?;
        info!("refresh token revoked");
        Ok(())
    }

    /// Load the account behind an authenticated request
    pub async fn current_user(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Delete refresh tokens whose stored expiry has passed
    pub async fn purge_expired_tokens(&self) -> Result<u64, AuthError> {
        self.refresh_tokens
            .delete_expired(Utc::now().timestamp())
            .await
            .map_err(AuthError::Persistence)
    }

    /// Signature and expiry via the codec, then presence and stored expiry.
    ///
    /// The stored expiry is authoritative even if the signed `exp` disagrees.
    async fn check_refresh_token(&self, token: &str) -> Result<(Claims, RefreshToken), AuthError> {
        let now = Utc::now().timestamp();

        let claims = self
            .codec
            .verify_at(token, now)
            .map_err(AuthError::InvalidToken)?;

        let record = self.refresh_tokens.get_by_token(token).await?;

        if record.expires_at <= now {
            return Err(AuthError::Expired);
        }

        Ok((claims, record))
    }

    async fn persist_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: i64,
    ) -> Result<(), AuthError> {
        let new_token = NewRefreshToken {
            user_id,
            token: token.to_string(),
            expires_at,
        };

        match self.refresh_tokens.create_token(new_token).await {
            Ok(record) => {
                debug!(user_id, token_id = record.id, "refresh token persisted");
                Ok(())
            }
            // Same user, same second: the signed token is byte-identical and
            // already stored, so the existing grant is the one being handed out.
            Err(StoreError::AlreadyExists) => {
                debug!(user_id, "identical refresh token already persisted");
                Ok(())
            }
            Err(e) => {
                warn!(user_id, error = %e, "failed to persist refresh token");
                Err(AuthError::Persistence(e))
            }
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let passwords = Arc::clone(&self.passwords);
        let password = Zeroizing::new(password.to_owned());

        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify_password(
        &self,
        stored_hash: Option<String>,
        password: &str,
    ) -> Result<bool, AuthError> {
        let passwords = Arc::clone(&self.passwords);
        let password = Zeroizing::new(password.to_owned());

        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => passwords.verify(&hash, &password),
            None => {
                passwords.verify_dummy(&password);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}
