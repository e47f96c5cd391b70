//! docquery CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. All startup logic lives in `cli`.

use docquery::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
