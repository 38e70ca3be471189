//! Core business logic layer

pub mod password_service;
pub mod token_codec;
pub mod user_service;

pub use password_service::PasswordService;
pub use token_codec::{Claims, TokenCodec};
pub use user_service::UserService;
