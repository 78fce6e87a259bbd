//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use fila_core::FilaConfig;
use fila_web::AppState;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides the config file)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Number of pooled database connections
    #[arg(long)]
    pub pool_size: Option<u32>,

    /// Keep tickets in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, mut config: FilaConfig) -> Result<()> {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(size) = args.pool_size {
        config.pool_size = size;
    }
    config.validate()?;

    let pool = if args.ephemeral {
        tracing::warn!("Running with an in-memory database; tickets are lost on exit");
        fila_db::init_memory_pool().await?
    } else {
        fila_db::init_pool(&config.database_path, config.pool_options()).await?
    };
    tracing::info!(
        db = %config.database_path.display(),
        pool_size = pool.size(),
        "Database ready"
    );
    let database = if args.ephemeral {
        "in-memory".to_string()
    } else {
        config.database_path.display().to_string()
    };
    let state = AppState::new(pool, &config);

    println!();
    println!("  {} {}", "Fila".cyan().bold(), "Queue Server".bold());
    println!();
    println!(
        "  {}        http://{}:{}/api/tickets",
        "API".green(),
        config.host,
        config.port
    );
    println!(
        "  {}  ws://{}:{}/ws",
        "WebSocket".green(),
        config.host,
        config.port
    );
    println!("  {}   {}", "Database".green(), database);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    fila_web::run_server(state, &config.host, config.port).await?;

    Ok(())
}
