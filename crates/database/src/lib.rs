//! SQLite persistence layer for the Threadswap marketplace.
//!
//! This crate provides async database operations for users, listings,
//! trades, chats, and reviews using SQLx with SQLite.
//!
//! Single-record operations take a `&SqlitePool`. Operations that are
//! composed into larger atomic units by the `marketplace` crate have `_tx`
//! variants taking a `&mut SqliteConnection` so several of them can run
//! inside one transaction.
//!
//! # Example
//!
//! ```no_run
//! use database::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:threadswap.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     database::user::create_user(db.pool(), "u-1", "Bea", None).await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod error;
pub mod listing;
pub mod models;
pub mod review;
pub mod trade;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{
    Chat, Listing, Message, MessageKind, Review, ReviewWithNames, Side, Trade,
    TradeItem, TradeStatus, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let db = test_db().await;

        let created = user::create_user(db.pool(), "u-alice", "Alice", None)
            .await
            .unwrap();
        assert_eq!(created.level, 1);
        assert_eq!(created.experience, 0);
        assert_eq!(created.image, "/default-avatar.png");

        let fetched = user::get_user(db.pool(), "u-alice").await.unwrap();
        assert_eq!(fetched, created);

        let missing = user::get_user(db.pool(), "u-nobody").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let db = test_db().await;

        user::create_user(db.pool(), "u-1", "Alice", None)
            .await
            .unwrap();
        let dup = user::create_user(db.pool(), "u-1", "Alice again", None).await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));
    }
}
