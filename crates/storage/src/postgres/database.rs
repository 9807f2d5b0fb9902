//! PostgreSQL pool backing notifications, transaction logs and the cursor.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use conductor_core::error::{StorageError, StorageResult};

use super::helpers::map_sqlx_error;

/// Reported to Postgres as `application_name`.
const APPLICATION_NAME: &str = "conductor";

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Pool size. Handlers run one at a time, plus the cursor writer.
    pub max_connections: u32,
    /// Wait for a pooled connection before failing with a retryable
    /// connection error.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/conductor".to_string(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl DatabaseConfig {
    pub fn for_relay(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    fn connect_options(&self) -> StorageResult<PgConnectOptions> {
        PgConnectOptions::from_str(&self.url)
            .map(|options| options.application_name(APPLICATION_NAME))
            .map_err(|e| StorageError::ConnectionError(format!("invalid database URL: {e}")))
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and check that one connection can be established.
    #[instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let options = config.connect_options()?;
        debug!(
            host = options.get_host(),
            database = options.get_database().unwrap_or_default(),
            max_conn = config.max_connections,
            acquire_timeout_ms = config.acquire_timeout.as_millis(),
            "Creating connection pool"
        );

        let pool = config
            .pool_options()
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Self { pool })
    }

    /// Build the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> StorageResult<Self> {
        let options = config.connect_options()?;
        Ok(Self {
            pool: config.pool_options().connect_lazy_with(options),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded relay migrations.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> StorageResult<()> {
        let migrator = sqlx::migrate!("./migrations");
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationError(e.to_string()))?;

        info!(migrations = migrator.migrations.len(), "🗄️  Schema up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
