//! Authentication error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Why a signed token was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("signature does not match")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,
}

/// Credential / refresh-token store error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("user {0} does not exist")]
    UnknownUser(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Authentication error
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[source] TokenError),

    #[error("account already exists")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("refresh token expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists => Self::AlreadyExists,
            other => Self::Persistence(other),
        }
    }
}

/// Unparseable or incomplete request bodies are validation failures
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl AuthError {
    /// HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,

            Self::InvalidCredentials
            | Self::MissingCredentials
            | Self::InvalidToken(_)
            | Self::Expired => StatusCode::UNAUTHORIZED,

            Self::AlreadyExists => StatusCode::CONFLICT,

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::Signing(_) | Self::Persistence(_) | Self::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingCredentials => "unauthorized",
            Self::InvalidToken(_) => "invalid_token",
            Self::AlreadyExists => "email_exists",
            Self::NotFound => "not_found",
            Self::Expired => "token_expired",
            Self::Signing(_) | Self::Persistence(_) | Self::Hashing(_) => "server_error",
        }
    }

    /// Message safe to show across the trust boundary.
    ///
    /// Internal failures collapse into one generic message; their detail only
    /// goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(reason) => reason.clone(),
            Self::InvalidCredentials => "invalid email or password".to_string(),
            Self::MissingCredentials => "missing or malformed authorization header".to_string(),
            Self::InvalidToken(_) => "invalid token".to_string(),
            Self::AlreadyExists => "email already registered".to_string(),
            Self::NotFound => "not found".to_string(),
            Self::Expired => "refresh token expired, please log in again".to_string(),
            Self::Signing(_) | Self::Persistence(_) | Self::Hashing(_) => {
                "internal server error".to_string()
            }
        }
    }

    /// Internal, non-recoverable for this request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Signing(_) | Self::Persistence(_) | Self::Hashing(_)
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "auth request failed");
        }

        let body = Json(json!({
            "code": self.error_code(),
            "message": self.user_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::AlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidToken(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Hashing("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_conversion() {
        assert!(matches!(AuthError::from(StoreError::NotFound), AuthError::NotFound));
        assert!(matches!(AuthError::from(StoreError::AlreadyExists), AuthError::AlreadyExists));
        assert!(matches!(
            AuthError::from(StoreError::UnknownUser(3)),
            AuthError::Persistence(StoreError::UnknownUser(3))
        ));
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = AuthError::Persistence(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.user_message(), "internal server error");
        assert_eq!(err.error_code(), "server_error");
        // the cause is still reachable for logging
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_token_keeps_cause() {
        let err = AuthError::InvalidToken(TokenError::InvalidSignature);
        assert_eq!(err.to_string(), "invalid token: signature does not match");
        assert_eq!(err.user_message(), "invalid token");
    }
}
