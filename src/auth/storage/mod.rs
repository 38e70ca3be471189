//! Storage abstraction layer
//!
//! Narrow traits for the credential store and the refresh-token store, with an
//! in-memory backend (tests, dev runs) and a SQLite backend.

pub mod memory;
pub mod sqlite;
pub mod r#trait;

pub use memory::MemoryStorage;
pub use r#trait::{RefreshTokenStore, UserStore};
pub use sqlite::SqliteStorage;
