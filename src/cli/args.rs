//! CLI argument definitions using clap
//!
//! Commands:
//! - penlog append --log <base> [--data <text>]
//! - penlog read --log <base> --id <n>
//! - penlog last --log <base>
//! - penlog count --log <base>
//! - penlog truncate --log <base> --at <n>
//! - penlog scan --file <path> [--from <unit>]
//! - penlog cursor-get --file <path> [--default <n>]
//! - penlog cursor-set --file <path> --value <n>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// penlog - append-only checksummed log storage
#[derive(Parser, Debug)]
#[command(name = "penlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON options file (pad, magic, block_size)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a record to a monotonic log and print its ID
    Append {
        /// Base path; `<log>.index` and `<log>.data` are used
        #[arg(long)]
        log: PathBuf,

        /// Record contents; read from stdin when omitted
        #[arg(long)]
        data: Option<String>,
    },

    /// Read the record stored under an ID
    Read {
        /// Base path of the monotonic log
        #[arg(long)]
        log: PathBuf,

        /// Record ID
        #[arg(long)]
        id: u64,
    },

    /// Read the most recent record
    Last {
        /// Base path of the monotonic log
        #[arg(long)]
        log: PathBuf,
    },

    /// Print the number of records
    Count {
        /// Base path of the monotonic log
        #[arg(long)]
        log: PathBuf,
    },

    /// Discard every record with ID >= `at`
    Truncate {
        /// Base path of the monotonic log
        #[arg(long)]
        log: PathBuf,

        /// First ID to discard
        #[arg(long)]
        at: u64,
    },

    /// List the valid records of a raw append log file
    Scan {
        /// Append log file
        #[arg(long)]
        file: PathBuf,

        /// Unit offset to start from
        #[arg(long, default_value_t = 0)]
        from: u64,
    },

    /// Print a stored offset
    CursorGet {
        /// Cursor file
        #[arg(long)]
        file: PathBuf,

        /// Value printed when nothing valid is stored
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        default: i64,
    },

    /// Store an offset and sync it
    CursorSet {
        /// Cursor file
        #[arg(long)]
        file: PathBuf,

        /// Offset to store
        #[arg(long, allow_negative_numbers = true)]
        value: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
