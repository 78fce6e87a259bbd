//! Service configuration.
//!
//! Values come from an optional `fila.toml`, then the `FILA_DB_PATH` and
//! `FILA_WEB_URL` environment variables. The CLI applies its own flags last.

use crate::error::{FilaError, FilaResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fila.toml";

/// Runtime settings shared by the server and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilaConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub acquire_timeout_ms: u64,
    pub store_retries: u32,
    pub retry_backoff_ms: u64,
    pub outbox_capacity: usize,
    pub web_url: String,
}

impl Default for FilaConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".fila/fila.db"),
            host: "127.0.0.1".to_string(),
            port: 3030,
            pool_size: 8,
            acquire_timeout_ms: 2000,
            store_retries: 2,
            retry_backoff_ms: 50,
            outbox_capacity: 64,
            web_url: "http://127.0.0.1:3030".to_string(),
        }
    }
}

impl FilaConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `fila.toml` in the current
    /// directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> FilaResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> FilaResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)
            .map_err(|e| FilaError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse TOML text; missing keys keep their defaults.
    pub fn from_toml(raw: &str) -> FilaResult<Self> {
        toml::from_str(raw).map_err(|e| FilaError::Config(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("FILA_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("FILA_WEB_URL") {
            self.web_url = url;
        }
    }

    /// Reject settings the pool or registry cannot work with.
    pub fn validate(&self) -> FilaResult<()> {
        if self.pool_size == 0 {
            return Err(FilaError::Config("pool_size must be at least 1".into()));
        }
        if self.outbox_capacity == 0 {
            return Err(FilaError::Config("outbox_capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Pool sizing derived from this config.
    pub fn pool_options(&self) -> fila_db::PoolOptions {
        fila_db::PoolOptions {
            size: self.pool_size,
            acquire_timeout: self.acquire_timeout(),
            ..fila_db::PoolOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FilaConfig::from_toml("port = 8080\nstore_retries = 5\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_retries, 5);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.database_path, PathBuf::from(".fila/fila.db"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = FilaConfig::from_toml("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, FilaError::Config(_)));
    }

    #[test]
    fn test_zero_pool_rejected() {
        let config = FilaConfig {
            pool_size: 0,
            ..FilaConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
