//! PostgreSQL storage adapter.
//!
//! This module implements the repository traits defined in `conductor-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgRepositories`] - All repositories sharing one pool
//! - Individual repos: `PgNotificationRepository`,
//!   `PgTransactionLogRepository`, `PgCursorRepository`
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_relay(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(&db);
//! ```

mod cursor_repo;
mod database;
mod helpers;
mod notification_repo;
mod transaction_repo;

pub use cursor_repo::PgCursorRepository;
pub use database::{Database, DatabaseConfig};
pub use notification_repo::PgNotificationRepository;
pub use transaction_repo::PgTransactionLogRepository;

use std::sync::Arc;

// =============================================================================
// Composite Repository
// =============================================================================

/// PostgreSQL repositories for every relational port.
#[derive(Clone)]
pub struct PgRepositories {
    pub notifications: Arc<PgNotificationRepository>,
    pub transactions: Arc<PgTransactionLogRepository>,
    pub cursor: Arc<PgCursorRepository>,
}

impl PgRepositories {
    /// Create the repositories from a database connection.
    pub fn new(db: &Database) -> Self {
        Self {
            notifications: Arc::new(PgNotificationRepository::new(db)),
            transactions: Arc::new(PgTransactionLogRepository::new(db)),
            cursor: Arc::new(PgCursorRepository::new(db)),
        }
    }
}
