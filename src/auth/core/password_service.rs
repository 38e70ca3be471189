//! Password hashing service

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::auth::errors::AuthError;

/// bcrypt only reads this many bytes of input; anything longer is refused
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt hashing with a per-call random salt embedded in the output.
///
/// All calls are CPU bound; async callers should run them on the blocking pool.
pub struct PasswordService {
    cost: u32,
    /// Throwaway hash used to equalise the cost of unknown-account logins
    dummy_hash: OnceCell<String>,
}

impl PasswordService {
    /// Create a password service with a fixed bcrypt cost
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are rejected, never truncated.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a password against a stored hash (constant-time comparison).
    ///
    /// An unparseable hash never matches, nor does an over-long plaintext.
    pub fn verify(&self, hash: &str, plaintext: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }

    /// Spend one verification's worth of CPU without a real account, so that
    /// unknown emails and wrong passwords take the same time.
    pub fn verify_dummy(&self, plaintext: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| bcrypt::hash("dummy-password-for-timing", self.cost));
        if let Ok(hash) = dummy {
            let _ = bcrypt::verify(plaintext, hash);
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
