//! penlog - append-only, checksummed log storage
//!
//! On-disk formats and access primitives:
//! - `codec`: fixed and variable record encoding with built-in checksums
//! - `append`: padded variable-length log, lock-free concurrent appends
//! - `fixed`: array of checksummed fixed-size slots
//! - `monotonic`: dense-ID log built from the two above
//! - `cursor`: single durable offset for scan progress

pub mod append;
pub mod cli;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod fixed;
pub mod monotonic;
pub mod observability;
pub mod positional;

pub use append::{AppendLog, AppendReader};
pub use config::LogOptions;
pub use cursor::OffsetCursor;
pub use errors::{ErrorCode, PenError, PenResult};
pub use fixed::FixedStore;
pub use monotonic::{MonotonicLog, SharedMonotonicLog};
