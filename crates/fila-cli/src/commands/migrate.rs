//! Schema migration command.

use anyhow::Result;
use colored::Colorize;
use fila_core::FilaConfig;

pub async fn execute(config: &FilaConfig) -> Result<()> {
    // init_pool runs pending migrations before returning
    fila_db::init_pool(&config.database_path, config.pool_options()).await?;

    println!(
        "{} Database schema is up to date ({})",
        "✓".green().bold(),
        config.database_path.display().to_string().dimmed()
    );
    Ok(())
}
