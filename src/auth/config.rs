//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::core::token_codec::MIN_SECRET_LEN;
use crate::config::{parse_var, ConfigError};

/// Access tokens live 15 minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
/// Refresh tokens live 7 days
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Expired refresh tokens are swept hourly
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// Upper bound for any horizon (10 years)
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Cost range accepted by bcrypt
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Authentication configuration. Loaded once at startup.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 signing secret
    pub jwt_secret: String,

    /// Access token horizon (seconds)
    pub access_token_ttl_secs: u64,

    /// Refresh token horizon (seconds)
    pub refresh_token_ttl_secs: u64,

    /// bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Replace the refresh token on every `/auth/refresh`
    pub rotate_refresh_tokens: bool,

    /// How often expired refresh tokens are deleted (seconds)
    pub cleanup_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            rotate_refresh_tokens: false,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .field("cleanup_interval_secs", &self.cleanup_interval_secs)
            .finish()
    }
}

impl AuthConfig {
    /// Apply `JWT_SECRET`, `ACCESS_TOKEN_TTL`, `REFRESH_TOKEN_TTL`, `BCRYPT_COST`,
    /// `ROTATE_REFRESH_TOKENS` and `TOKEN_CLEANUP_INTERVAL` overrides.
    pub fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(ttl) = parse_var(lookup, "ACCESS_TOKEN_TTL")? {
            self.access_token_ttl_secs = ttl;
        }
        if let Some(ttl) = parse_var(lookup, "REFRESH_TOKEN_TTL")? {
            self.refresh_token_ttl_secs = ttl;
        }
        if let Some(cost) = parse_var(lookup, "BCRYPT_COST")? {
            self.bcrypt_cost = cost;
        }
        if let Some(rotate) = parse_var(lookup, "ROTATE_REFRESH_TOKENS")? {
            self.rotate_refresh_tokens = rotate;
        }
        if let Some(interval) = parse_var(lookup, "TOKEN_CLEANUP_INTERVAL")? {
            self.cleanup_interval_secs = interval;
        }
        Ok(())
    }

    /// Reject configurations the token lifecycle cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.access_token_ttl_secs == 0 || self.access_token_ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::Invalid(
                "access_token_ttl_secs must be between 1 second and 10 years".to_string(),
            ));
        }
        if self.refresh_token_ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::Invalid(
                "refresh_token_ttl_secs must not exceed 10 years".to_string(),
            ));
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(ConfigError::Invalid(
                "refresh_token_ttl_secs must be longer than access_token_ttl_secs".to_string(),
            ));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cleanup_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Access horizon as signed unix seconds
    pub(crate) fn access_ttl(&self) -> i64 {
        self.access_token_ttl_secs.min(MAX_TTL_SECS) as i64
    }

    /// Refresh horizon as signed unix seconds
    pub(crate) fn refresh_ttl(&self) -> i64 {
        self.refresh_token_ttl_secs.min(MAX_TTL_SECS) as i64
    }
}
