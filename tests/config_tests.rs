use gymapp_auth::auth::config::{DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS};
use gymapp_auth::config::{AppConfig, ConfigError};
use std::collections::HashMap;

const SECRET: &str = "config-test-signing-secret-0123456789abcdef";

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let cfg = AppConfig::default();

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.max_connections, 5);
    assert_eq!(cfg.auth.access_token_ttl_secs, DEFAULT_ACCESS_TOKEN_TTL_SECS);
    assert_eq!(cfg.auth.refresh_token_ttl_secs, DEFAULT_REFRESH_TOKEN_TTL_SECS);
    assert!(!cfg.auth.rotate_refresh_tokens);

    // no secret configured yet
    assert!(cfg.validate().is_err());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let cfg = AppConfig::from_toml_str(
        r#"
        [server]
        port = 9090

        [auth]
        jwt_secret = "config-test-signing-secret-0123456789abcdef"
        rotate_refresh_tokens = true
        "#,
    )
    .unwrap();

    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.auth.jwt_secret, SECRET);
    assert!(cfg.auth.rotate_refresh_tokens);
    assert_eq!(cfg.auth.access_token_ttl_secs, 900);
    cfg.validate().unwrap();
}

#[test]
fn test_invalid_toml() {
    let result = AppConfig::from_toml_str("[server]\nport = \"not a number\"");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_env_overrides_file() {
    let mut cfg = AppConfig::from_toml_str("[server]\nport = 9090").unwrap();
    let lookup = lookup_from(&[
        ("SERVER_PORT", "7000"),
        ("DATABASE_URL", "memory"),
        ("JWT_SECRET", SECRET),
        ("ACCESS_TOKEN_TTL", "60"),
        ("REFRESH_TOKEN_TTL", "3600"),
        ("BCRYPT_COST", "10"),
        ("ROTATE_REFRESH_TOKENS", "true"),
    ]);

    cfg.apply_overrides(&lookup).unwrap();

    assert_eq!(cfg.server.port, 7000);
    assert!(cfg.database.is_memory());
    assert_eq!(cfg.auth.access_token_ttl_secs, 60);
    assert_eq!(cfg.auth.refresh_token_ttl_secs, 3600);
    assert_eq!(cfg.auth.bcrypt_cost, 10);
    assert!(cfg.auth.rotate_refresh_tokens);
    cfg.validate().unwrap();
}

#[test]
fn test_unparseable_env_value() {
    let mut cfg = AppConfig::default();
    let lookup = lookup_from(&[("ACCESS_TOKEN_TTL", "fifteen minutes")]);

    let result = cfg.apply_overrides(&lookup);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidVar { key: "ACCESS_TOKEN_TTL", .. })
    ));
}

#[test]
fn test_refresh_horizon_must_exceed_access() {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = SECRET.to_string();
    cfg.auth.access_token_ttl_secs = 3600;
    cfg.auth.refresh_token_ttl_secs = 3600;

    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_secret_never_in_debug_output() {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = SECRET.to_string();

    let debug = format!("{cfg:?}");
    assert!(!debug.contains(SECRET));
    assert!(debug.contains("<redacted>"));
}
