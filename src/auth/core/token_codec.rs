//! HS256 token signing and verification

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::auth::errors::{AuthError, TokenError};

/// Shortest signing secret the codec accepts, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Placeholder secrets shipped in sample configs
const PLACEHOLDER_SECRETS: &[&str] = &[
    "your-secret-key-change-in-production",
    "dev_secret_key_change_in_production",
];

/// Token claims. Any other claim set is rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Stateless signer/verifier for access and refresh tokens.
///
/// The codec knows nothing about horizons: callers pick `exp`. Signing is
/// deterministic, so equal inputs give byte-identical tokens.
pub struct TokenCodec {
    /// Signing secret (zeroized on drop)
    secret: Zeroizing<Vec<u8>>,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the shared secret
    ///
    /// # Security
    /// - rejects secrets shorter than [`MIN_SECRET_LEN`]
    /// - rejects known placeholder secrets
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Validation(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if PLACEHOLDER_SECRETS.contains(&secret) {
            return Err(AuthError::Validation(
                "JWT secret is a placeholder value".to_string(),
            ));
        }

        // exp is checked by hand so that "now == exp" is already expired
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
            validation,
        })
    }

    /// Sign `{sub, iat, exp}`
    pub fn issue(&self, subject: i64, issued_at: i64, expires_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject,
            iat: issued_at,
            exp: expires_at,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(AuthError::Signing)
    }

    /// Verify against the current wall clock
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature first, then require `now < exp`
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
