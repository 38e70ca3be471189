//! Property-based tests
//!
//! Random inputs against the register/login and token invariants

mod util;

use gymapp_auth::auth::core::TokenCodec;
use gymapp_auth::auth::{AuthError, TokenError};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    // bcrypt dominates the cost of each case
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn register_then_login_same_id(
        local in "[a-z0-9]{1,16}",
        domain in "[a-z]{1,10}",
        password in "[ -~]{1,32}",
    ) {
        let email = format!("{local}@{domain}.com");
        let rt = runtime();
        let (registered, logged_in) = rt.block_on(async {
            let (service, _) = util::memory_service();
            let registered = service.register(&email, &password).await.unwrap();
            let logged_in = service.login(&email, &password).await.unwrap();
            (registered, logged_in)
        });
        prop_assert_eq!(registered.id, logged_in.id);
    }

    #[test]
    fn wrong_password_never_logs_in(
        password in "[a-z]{1,16}",
        wrong in "[A-Z]{1,16}",
    ) {
        let rt = runtime();
        let result = rt.block_on(async {
            let (service, _) = util::memory_service();
            service.register("alice@example.com", &password).await.unwrap();
            service.login("alice@example.com", &wrong).await
        });
        prop_assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}

proptest! {
    #[test]
    fn issued_tokens_verify_until_expiry(
        sub in any::<i64>(),
        iat in 0i64..4_000_000_000,
        ttl in 1i64..1_000_000,
    ) {
        let codec = TokenCodec::new(util::TEST_SECRET).unwrap();
        let token = codec.issue(sub, iat, iat + ttl).unwrap();

        let claims = codec.verify_at(&token, iat + ttl - 1).unwrap();
        prop_assert_eq!(claims.sub, sub);
        prop_assert_eq!(codec.verify_at(&token, iat + ttl), Err(TokenError::Expired));
    }

    #[test]
    fn other_secret_never_verifies(
        sub in any::<i64>(),
        suffix in "[a-zA-Z0-9]{32,48}",
    ) {
        prop_assume!(suffix != util::TEST_SECRET);
        let codec = TokenCodec::new(util::TEST_SECRET).unwrap();
        let other = TokenCodec::new(&suffix).unwrap();
        let token = codec.issue(sub, 1_000, 2_000).unwrap();

        prop_assert_eq!(other.verify_at(&token, 1_500), Err(TokenError::InvalidSignature));
    }
}
