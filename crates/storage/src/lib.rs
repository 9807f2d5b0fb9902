//! Storage layer for the Conductor relay.
//!
//! This crate provides PostgreSQL implementations of the repository traits
//! defined in `conductor-core`: actor notifications, the commerce transaction
//! log and the listener cursor.
//!
//! # Usage
//!
//! ```ignore
//! use conductor_storage::{Database, DatabaseConfig, PgRepositories};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_relay(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create repositories
//! let repositories = PgRepositories::new(&db);
//! ```

pub mod postgres;

pub use postgres::{
    Database, DatabaseConfig, PgCursorRepository, PgNotificationRepository, PgRepositories,
    PgTransactionLogRepository,
};
