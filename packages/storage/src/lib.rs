// ABOUTME: Data layer and persistence for Reqhub
// ABOUTME: SQLite pool initialization, embedded migrations, and the shared storage error

use std::path::PathBuf;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Record not found")]
    NotFound,
}

impl StorageError {
    /// True when the underlying database rejected a write on a UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Sqlx(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: reqhub_core::default_database_path(),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

impl StorageConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Open the SQLite pool described by `config` and bring the schema up to date
pub async fn init_pool(config: &StorageConfig) -> StorageResult<SqlitePool> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    debug!("Connecting to database: {}", config.path.display());

    let journal_mode = if config.enable_wal {
        SqliteJournalMode::Wal
    } else {
        SqliteJournalMode::Delete
    };

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(journal_mode)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
        .connect_with(options)
        .await?;

    info!("Database connection established");

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply all pending embedded migrations
pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database migrations completed");
    Ok(())
}
