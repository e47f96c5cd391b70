//! CLI argument definitions using clap
//!
//! Commands:
//! - docquery serve [--config <path>]
//! - docquery explain [--search ..] [--sort ..] [--page ..] [--page-size ..] [--filters <path>|-]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// docquery - filter, search and paginate any document collection over HTTP
#[derive(Parser, Debug)]
#[command(name = "docquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the store and serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the pipeline a query compiles to, without running it
    Explain(ExplainArgs),
}

/// Query parameters for `explain`, spelled as on the HTTP API
#[derive(Args, Debug, Default)]
pub struct ExplainArgs {
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// "<field> <asc|desc>"
    #[arg(long)]
    pub sort: Option<String>,

    /// Zero-based page number
    #[arg(long)]
    pub page: Option<String>,

    /// Documents per page
    #[arg(long = "page-size")]
    pub page_size: Option<String>,

    /// JSON file holding the filter descriptor array, or "-" for stdin
    #[arg(long)]
    pub filters: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
