//! API request handlers (thin)

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::auth::{
    errors::AuthError,
    types::{
        AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, User, BEARER,
    },
    AuthService,
};

use super::middleware::AuthenticatedUser;

/// Registration handler
pub async fn register(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let Json(req) = payload?;
    let user = service.register(&req.email, &req.password).await?;
    let tokens = service.generate_tokens(user.id).await?;

    info!(user_id = user.id, "API: user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}

/// Login handler
pub async fn login(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let Json(req) = payload?;
    let user = service.login(&req.email, &req.password).await?;
    let tokens = service.generate_tokens(user.id).await?;

    info!(user_id = user.id, "API: user logged in");
    Ok(Json(AuthResponse::new(user, tokens)))
}

/// Exchange a refresh token; rotates it when configured to
pub async fn refresh(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, Response> {
    let Json(req) = payload.map_err(|e| AuthError::from(e).into_response())?;
    let expires_in = service.config().access_token_ttl_secs;

    let response = if service.config().rotate_refresh_tokens {
        let tokens = service
            .rotate_refresh_token(&req.refresh_token)
            .await
            .map_err(refresh_rejection)?;
        RefreshResponse {
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            token_type: BEARER,
            expires_in,
        }
    } else {
        let access_token = service
            .refresh_access_token(&req.refresh_token)
            .await
            .map_err(refresh_rejection)?;
        RefreshResponse {
            access_token,
            refresh_token: None,
            token_type: BEARER,
            expires_in,
        }
    };

    Ok(Json(response))
}

/// Revoke a refresh token
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<StatusCode, Response> {
    let Json(req) = payload.map_err(|e| AuthError::from(e).into_response())?;
    service
        .logout(&req.refresh_token)
        .await
        .map_err(refresh_rejection)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current user (behind the bearer gate)
pub async fn me(
    State(service): State<Arc<AuthService>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<User>, AuthError> {
    let user = service.current_user(user_id).await?;
    Ok(Json(user))
}

/// Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// An unknown refresh token is a credential failure to the client, not a missing resource
fn refresh_rejection(err: AuthError) -> Response {
    match err {
        AuthError::NotFound => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "code": "invalid_token",
                "message": "refresh token is not recognised",
            })),
        )
            .into_response(),
        other => other.into_response(),
    }
}
