//! CLI module for penlog
//!
//! Thin wrapper over the stores for inspection and maintenance:
//! - append / read / last / count / truncate on monotonic logs
//! - scan on raw append log files
//! - cursor-get / cursor-set on offset cursors

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{load_options, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
