//! API route definitions

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware::require_bearer};
use crate::auth::AuthService;

/// Auth request bodies are a couple of short strings
const MAX_BODY_SIZE: usize = 16 * 1024;

/// Authentication routes
pub fn create_auth_routes(service: Arc<AuthService>) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_bearer));

    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .merge(protected)
        .with_state(service)
}

/// Full application: auth routes, health check, tracing, CORS and body limits
pub fn create_app(service: Arc<AuthService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(create_auth_routes(service))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
                .layer(cors),
        )
}
