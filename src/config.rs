//! Service configuration
//!
//! Loaded from an optional JSON file, then overridden from the process
//! environment (a `.env` file is read first by the CLI):
//!
//! - `DATABASE`: MongoDB connection string, selects the MongoDB backend
//! - `DOCQUERY_SEED`: seed file for the in-memory backend
//! - `HOST`, `PORT`: listen address
//! - `RUST_LOG`: log filter, read by the logging layer

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::HttpServerConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which document store backs the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process store, optionally seeded from a JSON file
    Memory {
        #[serde(default)]
        seed_path: Option<PathBuf>,
    },
    /// MongoDB deployment
    Mongodb { uri: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory { seed_path: None }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load the file (if given), apply environment overrides, validate
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without overrides
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Env {
                name: "PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }

        // DATABASE wins over a seed file when both are set
        if let Some(uri) = lookup("DATABASE") {
            self.store = StoreConfig::Mongodb { uri };
        } else if let Some(seed) = lookup("DOCQUERY_SEED") {
            self.store = StoreConfig::Memory {
                seed_path: Some(PathBuf::from(seed)),
            };
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }

        if let StoreConfig::Mongodb { uri } = &self.store {
            if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
                return Err(ConfigError::Invalid(format!(
                    "store.uri must be a mongodb:// or mongodb+srv:// connection string, got '{}'",
                    uri
                )));
            }
        }

        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }
}
