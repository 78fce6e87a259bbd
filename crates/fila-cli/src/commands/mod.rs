//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fila_core::FilaConfig;
use std::path::PathBuf;

pub mod migrate;
pub mod serve;
pub mod ticket;

/// Fila - multi-tenant waiting queue with real-time calls
#[derive(Parser)]
#[command(name = "fila")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (defaults to ./fila.toml when present)
    #[arg(short, long, global = true, env = "FILA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Create or upgrade the database schema
    Migrate,

    /// Manage tickets
    #[command(subcommand)]
    Ticket(ticket::TicketCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = FilaConfig::load(self.config.as_deref())?;
        if let Some(db) = self.db {
            config.database_path = db;
        }

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Ticket(cmd) => ticket::execute(cmd, &config).await,
        }
    }
}
