//! Bearer authentication gate

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{errors::AuthError, types::BEARER, AuthService};

/// Subject of a verified access token, inserted as a request extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Reject requests without a valid access token; otherwise attach
/// [`AuthenticatedUser`] and continue. Storage is never consulted.
pub async fn require_bearer(
    State(service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingCredentials)?;

    let user_id = service.validate_token(token).map_err(|e| {
        debug!(error = %e, "bearer token rejected");
        e
    })?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}
