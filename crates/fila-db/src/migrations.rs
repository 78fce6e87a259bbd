//! Database migrations.

use crate::pool::{DbError, DbPool, DbResult};
use tracing::debug;

/// Apply every pending migration under `crates/fila-db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> DbResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))?;
    debug!("Database schema is up to date");
    Ok(())
}
