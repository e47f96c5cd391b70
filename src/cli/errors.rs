//! CLI-specific error types
//!
//! Every CLI error is fatal: `main` prints it and exits non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::CompileError;
use crate::store::StoreError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("Invalid filters: {0}")]
    Filters(String),

    /// Store could not be opened at startup
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Boot failed: {0}")]
    Boot(String),
}

impl CliError {
    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::Boot(msg.into())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
