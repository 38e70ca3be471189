//! SQLite storage via sqlx
//!
//! Security features:
//! - parameterized queries only
//! - UNIQUE constraints on `users.email` and `refresh_tokens.token`
//! - foreign key from refresh tokens to users

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::error::DatabaseError;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::r#trait::{RefreshTokenStore, UserStore};
use crate::auth::errors::StoreError;
use crate::auth::types::{NewRefreshToken, NewUser, RefreshToken, User};

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_create_users", include_str!("../../../migrations/001_create_users.sql")),
    ("002_create_refresh_tokens", include_str!("../../../migrations/002_create_refresh_tokens.sql")),
];

/// SQLite-backed credential and refresh-token store
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect, creating the database file if missing, and run migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let is_memory = database_url.contains(":memory:");

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30));
        if is_memory {
            // every connection to :memory: is its own database; keep exactly one alive
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(connect_options).await?;
        let storage = Self { pool };
        storage.migrate().await?;

        info!(in_memory = is_memory, "sqlite storage ready");
        Ok(storage)
    }

    /// Apply the schema. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for (name, sql) in MIGRATIONS {
            sqlx::raw_sql(sql).execute(&self.pool).await?;
            info!(migration = *name, "migration applied");
        }
        Ok(())
    }
}

/// Unique-constraint violations become `AlreadyExists`
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::AlreadyExists;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = Utc::now().timestamp();

        let id = sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(classify)?
            .last_insert_rowid();

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            height: None,
            weight: None,
            goal: None,
            created_at: now,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, height, weight, goal, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, height, weight, goal, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl RefreshTokenStore for SqliteStorage {
    async fn create_token(&self, token: NewRefreshToken) -> Result<RefreshToken, StoreError> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(now)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                return Err(StoreError::UnknownUser(token.user_id));
            }
            Err(e) => return Err(classify(e)),
        };

        Ok(RefreshToken {
            id,
            user_id: token.user_id,
            token: token.token,
            expires_at: token.expires_at,
            created_at: now,
        })
    }

    async fn get_by_token(&self, token: &str) -> Result<RefreshToken, StoreError> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_expired(&self, now: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
