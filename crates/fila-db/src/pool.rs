//! Bounded SQLite connection pool.
//!
//! The pool holds at most `size` connections. An operation that cannot get one
//! within the acquire timeout fails with [`DbError::PoolExhausted`], which is
//! transient and safe to retry. SQLite work runs on the driver's own worker
//! threads, so lock waits never occupy the async runtime.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Shared handle to the connection pool. Cheap to clone.
pub type DbPool = SqlitePool;

/// SQLite primary result codes for lock contention.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Connection(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                warn!("No database connection available");
                Self::PoolExhausted
            }
            other => Self::Connection(other),
        }
    }
}

impl DbError {
    /// Whether the operation may succeed if simply tried again later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::PoolExhausted => true,
            Self::Connection(sqlx::Error::Database(err)) => err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
            _ => false,
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Sizing for the pool.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Maximum number of open connections.
    pub size: u32,
    /// How long an operation waits for a free connection.
    pub acquire_timeout: Duration,
    /// SQLite busy handler timeout for lock contention between connections.
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: 8,
            acquire_timeout: Duration::from_secs(2),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Open a pool over the database file at `path`, creating it if missing.
pub async fn open_pool(path: &Path, options: PoolOptions) -> DbResult<DbPool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let connect = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(options.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(options.size.max(1))
        .acquire_timeout(options.acquire_timeout)
        .connect_with(connect)
        .await?;

    debug!(path = %path.display(), size = options.size, "Opened database pool");
    Ok(pool)
}

/// Single-connection pool over a private in-memory database.
///
/// Every in-memory connection is its own database, so the one connection is
/// never closed for idleness or age.
pub async fn memory_pool() -> DbResult<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(SqliteConnectOptions::new().in_memory(true))
        .await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_keeps_state() {
        let pool = memory_pool().await.unwrap();
        sqlx::query("CREATE TABLE t (v INTEGER)").execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO t VALUES (42)").execute(&pool).await.unwrap();

        let (value,): (i64,) = sqlx::query_as("SELECT v FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_exhausted_pool_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(
            &dir.path().join("fila.db"),
            PoolOptions {
                size: 1,
                acquire_timeout: Duration::from_millis(50),
                ..PoolOptions::default()
            },
        )
        .await
        .unwrap();
        let _held = pool.acquire().await.unwrap();

        let err: DbError = sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::PoolExhausted));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fila.db");
        let pool = open_pool(&path, PoolOptions::default()).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_not_found_is_not_transient() {
        assert!(!DbError::NotFound("x".into()).is_transient());
        assert!(!DbError::Conflict("x".into()).is_transient());
    }
}
