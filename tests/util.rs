// tests/util.rs
// Shared test helpers for integration tests
#![allow(dead_code)]

use gymapp_auth::auth::config::MIN_BCRYPT_COST;
use gymapp_auth::auth::{AuthConfig, AuthService, MemoryStorage};
use std::sync::Arc;

/// Test-only signing secret, long enough for the codec
pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

/// Auth config with the cheapest bcrypt cost so tests stay fast
pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        bcrypt_cost: MIN_BCRYPT_COST,
        ..AuthConfig::default()
    }
}

/// Service over fresh in-memory storage; the storage handle shares its tables
pub fn memory_service_with(config: AuthConfig) -> (Arc<AuthService>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let service = AuthService::with_storage(storage.clone(), config)
        .expect("test config must be valid");
    (Arc::new(service), storage)
}

pub fn memory_service() -> (Arc<AuthService>, MemoryStorage) {
    memory_service_with(test_config())
}
