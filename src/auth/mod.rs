//! User authentication module
//!
//! ## Layout
//!
//! ```text
//! auth/
//! ├── types.rs          # domain and wire types
//! ├── errors.rs         # error types
//! ├── config.rs         # token horizons, secret, bcrypt cost
//! ├── service.rs        # authentication service (facade)
//! ├── cleanup.rs        # expired refresh-token sweep
//! ├── core/             # business logic
//! │   ├── user_service.rs
//! │   ├── token_codec.rs
//! │   └── password_service.rs
//! ├── storage/          # storage abstraction
//! │   ├── trait.rs
//! │   ├── memory.rs
//! │   └── sqlite.rs
//! └── api/              # HTTP layer
//!     ├── routes.rs
//!     ├── middleware.rs
//!     └── handlers.rs
//! ```
//!
//! Requests flow API → service → storage; the service only sees the store
//! traits, so backends are swapped without touching it.

pub mod api;
pub mod cleanup;
pub mod config;
pub mod core;
pub mod errors;
pub mod service;
pub mod storage;
pub mod types;

pub use api::{create_app, create_auth_routes, AuthenticatedUser};
pub use cleanup::spawn_token_cleanup;
pub use config::AuthConfig;
pub use errors::{AuthError, StoreError, TokenError};
pub use service::AuthService;
pub use storage::{MemoryStorage, RefreshTokenStore, SqliteStorage, UserStore};
pub use types::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User};
