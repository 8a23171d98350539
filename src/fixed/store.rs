//! Fixed slot store over a single file
//!
//! ```text
//! slot 0                      slot 1
//! | hash64 | payload[size] |  | hash64 | payload[size] | ...
//! ```
//!
//! Writes to different slots are independent: there is no atomicity across
//! slots and no append primitive. Callers choose the index, usually the
//! current `slot_count()`.

use std::fs::{File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::codec::{decode_fixed, encode_fixed, FIXED_HEADER_SIZE};
use crate::errors::{PenError, PenResult};
use crate::positional::{write_all_at, PositionalRead};

const BATCH_SLOTS: u64 = 1024;

/// Number of whole slots in a file of `file_len` bytes.
pub fn slot_count_for(file_len: u64, fixed_size: usize) -> u64 {
    file_len / (FIXED_HEADER_SIZE + fixed_size) as u64
}

/// Array of checksummed fixed-size slots.
#[derive(Debug)]
pub struct FixedStore {
    path: Option<PathBuf>,
    file: File,
    fixed_size: usize,
}

impl FixedStore {
    /// Opens or creates the store file at `path`.
    pub fn open(path: &Path, fixed_size: usize) -> PenResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                PenError::io(format!("Failed to open slot store: {}", path.display()), e)
            })?;

        let mut store = Self::from_file(file, fixed_size);
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Wraps an already opened file. The file must be readable and writable.
    pub fn from_file(file: File, fixed_size: usize) -> Self {
        Self {
            path: None,
            file,
            fixed_size,
        }
    }

    /// Path of the store file, when opened by path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Payload bytes per slot
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    /// Header plus payload bytes per slot
    pub fn slot_size(&self) -> usize {
        FIXED_HEADER_SIZE + self.fixed_size
    }

    /// Current file length in bytes
    pub fn len_bytes(&self) -> PenResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| PenError::io("Failed to read slot store metadata", e))
    }

    /// Number of whole slots currently in the file
    pub fn slot_count(&self) -> PenResult<u64> {
        Ok(slot_count_for(self.len_bytes()?, self.fixed_size))
    }

    /// Writes `payload` into slot `index`.
    ///
    /// Writing past the end grows the file; skipped slots read back as
    /// checksum mismatches until written.
    pub fn write_at(&self, index: u64, payload: &[u8]) -> PenResult<()> {
        if payload.len() != self.fixed_size {
            return Err(PenError::invalid_argument(format!(
                "slot payload must be {} bytes, got {}",
                self.fixed_size,
                payload.len()
            )));
        }

        let offset = self.slot_offset(index)?;
        let block = encode_fixed(payload);
        write_all_at(&self.file, &block, offset).map_err(|e| {
            PenError::io(format!("Failed to write slot {}", index), e)
        })
    }

    /// Reads and verifies slot `index`.
    pub fn read_at(&self, index: u64) -> PenResult<Vec<u8>> {
        let offset = self.slot_offset(index)?;
        let mut block = vec![0u8; self.slot_size()];
        let n = self
            .file
            .read_at_most(&mut block, offset)
            .map_err(|e| PenError::io(format!("Failed to read slot {}", index), e))?;
        if n < block.len() {
            return Err(PenError::short_read(offset, block.len(), n));
        }

        let payload = decode_fixed(&block).map_err(|e| {
            PenError::checksum_mismatch(offset, format!("slot {}: {}", index, e.message()))
        })?;
        Ok(payload.to_vec())
    }

    /// Visits the slots in `range` in order, reading them in batches.
    ///
    /// `visit` receives each slot's verified payload or its
    /// `ChecksumMismatch`; a bad slot does not stop the walk. Slots past
    /// the end of the file are not visited.
    pub fn for_each_slot<F>(&self, range: Range<u64>, mut visit: F) -> PenResult<()>
    where
        F: FnMut(u64, PenResult<&[u8]>),
    {
        let slot_size = self.slot_size();
        let mut index = range.start;

        while index < range.end {
            let batch = (range.end - index).min(BATCH_SLOTS);
            let offset = self.slot_offset(index)?;
            let mut buf = vec![0u8; batch as usize * slot_size];
            let n = self
                .file
                .read_at_most(&mut buf, offset)
                .map_err(|e| PenError::io(format!("Failed to read slots from {}", index), e))?;

            let whole = n / slot_size;
            for (i, block) in buf[..whole * slot_size].chunks_exact(slot_size).enumerate() {
                let slot = index + i as u64;
                let block_offset = offset + (i * slot_size) as u64;
                visit(
                    slot,
                    decode_fixed(block).map_err(|e| {
                        PenError::checksum_mismatch(
                            block_offset,
                            format!("slot {}: {}", slot, e.message()),
                        )
                    }),
                );
            }

            if (whole as u64) < batch {
                break;
            }
            index += batch;
        }
        Ok(())
    }

    /// Cuts the file to exactly `slots` slots.
    pub fn truncate(&mut self, slots: u64) -> PenResult<()> {
        let len = self.slot_offset(slots)?;
        self.file
            .set_len(len)
            .map_err(|e| PenError::io(format!("Failed to truncate slot store to {} slots", slots), e))
    }

    /// Flushes written slots to stable storage
    pub fn sync(&self) -> PenResult<()> {
        self.file
            .sync_all()
            .map_err(|e| PenError::io("fsync failed on slot store", e))
    }

    fn slot_offset(&self, index: u64) -> PenResult<u64> {
        index
            .checked_mul(self.slot_size() as u64)
            .ok_or_else(|| PenError::invalid_argument(format!("slot index {} too large", index)))
    }
}
