//! HTTP surface of the auth module

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::{bearer_token, require_bearer, AuthenticatedUser};
pub use routes::{create_app, create_auth_routes};
