//! CLI module for docquery
//!
//! Provides command-line interface for:
//! - serve: Connect the store and serve the HTTP API
//! - explain: Print the pipeline a query compiles to

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ExplainArgs};
pub use commands::{explain, open_store, run, run_command, serve};
pub use errors::{CliError, CliResult};
pub use io::{read_filters, write_json};
