//! Feedline Database Crate
//!
//! This crate provides the persistence layer for the Feedline backend:
//! connection management, embedded migrations, and repository
//! implementations for accounts, follow edges, and microposts.

use sqlx::SqlitePool;

use feedline_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{AccountRepository, MicropostRepository, RelationshipRepository};

// Re-export entities
pub use entities::{Account, AccountChanges, Micropost, NewAccountRecord, NewMicropost, Relationship};

// Re-export types
pub use types::{
    errors::{AccountError, DatabaseError, FieldError, FollowError, MicropostError},
    AccountResult, DatabaseResult, FollowResult, MicropostResult,
};

/// Initialize the database: connect and apply migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
