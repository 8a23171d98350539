//! Durable offset cursor
//!
//! Persists a single `i64` (typically "how far I have scanned") as slot 0
//! of a fixed slot store with 8-byte payloads.
//!
//! Reads are lenient: a missing, short or corrupted slot yields the caller's
//! default instead of an error, so a consumer simply restarts from its
//! default position. The log stores themselves report corruption instead.

use std::path::Path;

use crate::errors::PenResult;
use crate::fixed::FixedStore;
use crate::observability::{Event, Logger};

const OFFSET_SIZE: usize = 8;
const OFFSET_SLOT: u64 = 0;

/// Checksummed single-value offset file.
#[derive(Debug)]
pub struct OffsetCursor {
    store: FixedStore,
}

impl OffsetCursor {
    /// Opens or creates the cursor file at `path`.
    pub fn open(path: &Path) -> PenResult<Self> {
        Ok(Self {
            store: FixedStore::open(path, OFFSET_SIZE)?,
        })
    }

    /// Path of the cursor file
    pub fn path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Stores `offset`, replacing the previous value. Not synced.
    pub fn set_offset(&self, offset: i64) -> PenResult<()> {
        self.store.write_at(OFFSET_SLOT, &offset.to_le_bytes())
    }

    /// Returns the stored offset, or `default` if there is none or it
    /// cannot be read back intact.
    pub fn read_or_default(&self, default: i64) -> i64 {
        match self.store.read_at(OFFSET_SLOT) {
            Ok(payload) => {
                let mut buf = [0u8; OFFSET_SIZE];
                buf.copy_from_slice(&payload);
                i64::from_le_bytes(buf)
            }
            Err(e) if e.is_short_read() => default,
            Err(e) => {
                let default_str = default.to_string();
                let error_str = e.to_string();
                Logger::warn(
                    Event::OffsetCursorReset,
                    &[
                        ("default", default_str.as_str()),
                        ("error", error_str.as_str()),
                    ],
                );
                default
            }
        }
    }

    /// Flushes the stored offset to stable storage
    pub fn sync(&self) -> PenResult<()> {
        self.store.sync()
    }
}
