//! penlog CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. The error response has already been written to stdout.

use penlog::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
