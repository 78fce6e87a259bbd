//! Fila Database Layer
//!
//! SQLite persistence for the ticket queue: a bounded sqlx connection pool,
//! schema migrations and row-level ticket queries.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use migrations::run_migrations;
pub use pool::{DbError, DbPool, DbResult, PoolOptions};

use std::path::Path;

/// Open a pool for the database at `db_path` and bring its schema up to date.
pub async fn init_pool(db_path: &Path, options: PoolOptions) -> DbResult<DbPool> {
    let pool = pool::open_pool(db_path, options).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// In-memory pool with the schema applied. Used by tests and `--ephemeral` runs.
pub async fn init_memory_pool() -> DbResult<DbPool> {
    let pool = pool::memory_pool().await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
