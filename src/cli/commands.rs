//! CLI command implementations
//!
//! `serve` startup sequence:
//! 1. `.env` load
//! 2. Configuration load and validation
//! 3. Logging
//! 4. Store connection (fatal on failure)
//! 5. Bind and serve until ctrl-c

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::args::{Command, ExplainArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_filters, write_json};
use crate::api::{AppState, HttpServer};
use crate::config::{Config, StoreConfig};
use crate::logging::init_logging;
use crate::pipeline::{PipelineComposer, RawQueryParams};
use crate::store::{DocumentStore, MemoryStore};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::Explain(args) => explain(args),
    }
}

/// Connect the store and serve the HTTP API
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let config = Config::load(config_path)?;
    init_logging(&config.logging)
        .map_err(|e| CliError::boot_failed(format!("Failed to initialize logging: {}", e)))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let store = open_store(&config.store).await?;
        let state = Arc::new(AppState::new(store));

        HttpServer::new(config.server.clone(), state)
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Compile a query offline and print the pipeline it renders to
pub fn explain(args: ExplainArgs) -> CliResult<()> {
    let filters = match &args.filters {
        Some(source) => read_filters(source)?,
        None => Vec::new(),
    };

    let params = RawQueryParams {
        search: args.search,
        sort: args.sort,
        page: args.page,
        page_size: args.page_size,
    };
    let pipeline = PipelineComposer::compose(&params.into_request(filters))?;

    write_json(&pipeline.to_json())
}

/// Open the configured store. This is the startup barrier: no request is
/// served before it returns.
pub async fn open_store(config: &StoreConfig) -> CliResult<Arc<dyn DocumentStore>> {
    match config {
        StoreConfig::Memory { seed_path: None } => {
            info!("using empty in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreConfig::Memory {
            seed_path: Some(path),
        } => {
            info!(seed = %path.display(), "using seeded in-memory store");
            Ok(Arc::new(MemoryStore::load_seed(path)?))
        }
        StoreConfig::Mongodb { uri } => connect_mongo(uri).await,
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongo(uri: &str) -> CliResult<Arc<dyn DocumentStore>> {
    let store = crate::store::MongoStore::connect(uri).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongo(_uri: &str) -> CliResult<Arc<dyn DocumentStore>> {
    Err(CliError::boot_failed(
        "MongoDB backend requested but docquery was built without the `mongodb` feature",
    ))
}
