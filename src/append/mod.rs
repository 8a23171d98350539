//! Padded append log
//!
//! Variable-length checksummed records placed at offsets that are multiples
//! of a padding unit (`pad`, 64 bytes by default). Addresses handed out to
//! callers are *unit offsets*: multiply by `pad` to get the byte offset.
//!
//! # Concurrency
//!
//! - `append` reserves its range with a single atomic add on a per-instance
//!   cursor, then performs one positional write. Concurrent appends never
//!   overlap; the order in which their writes land is unspecified.
//! - `read` and `scan` mutate nothing and need no locking.
//! - `overwrite` and truncation change existing bytes and must not race
//!   with other operations on the same records.
//!
//! # Scanning
//!
//! A scan treats a checksum mismatch as unwritten or torn space and moves
//! forward one unit at a time until it finds the next valid record. Reaching
//! the end of the data ends the scan successfully. A mismatch at the live
//! tail of a log that is still being written can therefore mean "not yet
//! durable"; tailing consumers should remember their position (see
//! [`crate::cursor::OffsetCursor`]) and scan again later.

mod log;
mod reader;

pub use log::AppendLog;
pub use reader::{read_record, scan_records, AppendReader};
