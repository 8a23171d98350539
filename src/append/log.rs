//! Append log writer with a lock-free bump-pointer cursor
//!
//! The cursor holds the next free unit offset. It starts at the file length
//! rounded up to a `pad` boundary and only moves forward, except when the
//! log is truncated through `&mut self`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::reader::{read_record, scan_records, AppendReader};
use crate::codec::{
    decode_header, encode_variable, padded_units, RecordHeader, VARIABLE_HEADER_SIZE,
};
use crate::config::LogOptions;
use crate::errors::{PenError, PenResult};
use crate::observability::{Event, Logger};
use crate::positional::{write_all_at, PositionalRead};

/// Read/write handle on a padded append log.
///
/// Share it between producer threads with `Arc`; `append` takes `&self`.
#[derive(Debug)]
pub struct AppendLog {
    path: Option<PathBuf>,
    file: File,
    options: LogOptions,
    next_unit: AtomicU64,
}

impl AppendLog {
    /// Opens or creates the log file at `path`.
    pub fn open(path: &Path, options: LogOptions) -> PenResult<Self> {
        options.validate()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                PenError::io(format!("Failed to open append log: {}", path.display()), e)
            })?;

        let mut log = Self::from_file(file, options)?;
        log.path = Some(path.to_path_buf());

        let path_str = path.display().to_string();
        let next_str = log.next_unit().to_string();
        Logger::info(
            Event::AppendLogOpen,
            &[("path", path_str.as_str()), ("next_unit", next_str.as_str())],
        );

        Ok(log)
    }

    /// Wraps an already opened file. The file must be readable and writable.
    pub fn from_file(file: File, options: LogOptions) -> PenResult<Self> {
        options.validate()?;

        let len = file
            .metadata()
            .map_err(|e| PenError::io("Failed to read append log metadata", e))?
            .len();

        Ok(Self {
            path: None,
            file,
            options,
            next_unit: AtomicU64::new(padded_units(len, options.pad)),
        })
    }

    /// Path of the log file, when opened by path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Options this log encodes and decodes with
    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Unit offset the next append will receive, absent concurrent appends
    pub fn next_unit(&self) -> u64 {
        self.next_unit.load(Ordering::Acquire)
    }

    /// Current file length in bytes
    pub fn len_bytes(&self) -> PenResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| PenError::io("Failed to read append log metadata", e))
    }

    /// Appends `payload` and returns `(start_unit, next_unit)`.
    ///
    /// The range is reserved with one atomic add, so concurrent callers
    /// always receive disjoint ranges. The write is not synced.
    pub fn append(&self, payload: &[u8]) -> PenResult<(u64, u64)> {
        let blob = encode_variable(payload, &self.options.magic)?;
        let units = padded_units(blob.len() as u64, self.options.pad);

        let start = self.next_unit.fetch_add(units, Ordering::AcqRel);
        let byte_offset = self.byte_offset(start)?;

        write_all_at(&self.file, &blob, byte_offset).map_err(|e| {
            PenError::io(format!("Failed to append record at unit {}", start), e)
        })?;

        Ok((start, start + units))
    }

    /// Replaces the record at `unit` with `payload`.
    ///
    /// The existing record's header must be valid. The new record may use
    /// the padding slack of the stored one: it fails with `Overflow`, leaving
    /// the record untouched, only when it needs more units than the stored
    /// record occupies. Must not run concurrently with other operations on
    /// the same record.
    pub fn overwrite(&self, unit: u64, payload: &[u8]) -> PenResult<()> {
        let byte_offset = self.byte_offset(unit)?;
        let existing = self.read_header(unit)?;

        let blob = encode_variable(payload, &self.options.magic)?;
        let reserved = padded_units(existing.encoded_len(), self.options.pad);
        let requested = padded_units(blob.len() as u64, self.options.pad);
        if requested > reserved {
            let unit_str = unit.to_string();
            let reserved_str = reserved.to_string();
            let requested_str = requested.to_string();
            Logger::warn(
                Event::OverwriteRejected,
                &[
                    ("unit", unit_str.as_str()),
                    ("reserved_units", reserved_str.as_str()),
                    ("requested_units", requested_str.as_str()),
                ],
            );
            return Err(PenError::overflow(unit, reserved, requested));
        }

        write_all_at(&self.file, &blob, byte_offset).map_err(|e| {
            PenError::io(format!("Failed to overwrite record at unit {}", unit), e)
        })
    }

    /// Reads and validates only the header of the record at `unit`.
    ///
    /// The payload checksum is not verified.
    pub fn read_header(&self, unit: u64) -> PenResult<RecordHeader> {
        let byte_offset = self.byte_offset(unit)?;

        let mut header = [0u8; VARIABLE_HEADER_SIZE];
        let n = self
            .file
            .read_at_most(&mut header, byte_offset)
            .map_err(|e| PenError::io(format!("Failed to read record at unit {}", unit), e))?;
        if n < VARIABLE_HEADER_SIZE {
            return Err(PenError::short_read(byte_offset, VARIABLE_HEADER_SIZE, n));
        }
        decode_header(&header, &self.options.magic, byte_offset)
    }

    /// Reads the record at `unit`; returns payload and next unit offset
    pub fn read(&self, unit: u64) -> PenResult<(Vec<u8>, u64)> {
        read_record(&self.file, unit, &self.options)
    }

    /// Scans from `from_unit`; see [`scan_records`]
    pub fn scan<F, E>(&self, from_unit: u64, callback: F) -> Result<(), E>
    where
        F: FnMut(&[u8], u64, u64) -> Result<(), E>,
        E: From<PenError>,
    {
        scan_records(&self.file, from_unit, &self.options, callback)
    }

    /// Opens an independent read-only handle on the same file
    pub fn reader(&self) -> PenResult<AppendReader> {
        let file = self
            .file
            .try_clone()
            .map_err(|e| PenError::io("Failed to clone append log handle", e))?;
        AppendReader::from_file(file, self.options)
    }

    /// Flushes appended records to stable storage
    pub fn sync(&self) -> PenResult<()> {
        self.file
            .sync_all()
            .map_err(|e| PenError::io("fsync failed on append log", e))
    }

    /// Cuts the log to `units` units and moves the cursor there
    pub fn truncate_units(&mut self, units: u64) -> PenResult<()> {
        let len = self.byte_offset(units)?;
        self.truncate_to(len, units)?;

        let units_str = units.to_string();
        Logger::info(Event::AppendLogTruncate, &[("units", units_str.as_str())]);
        Ok(())
    }

    /// Sets the file length to `len_bytes` and the cursor to `next_unit`.
    ///
    /// The two need not agree: truncating a monotonic log keeps the
    /// discarded boundary record's bytes on disk while handing its units to
    /// the next append.
    pub(crate) fn truncate_to(&mut self, len_bytes: u64, next_unit: u64) -> PenResult<()> {
        self.file.set_len(len_bytes).map_err(|e| {
            PenError::io(format!("Failed to truncate append log to {} bytes", len_bytes), e)
        })?;
        *self.next_unit.get_mut() = next_unit;
        Ok(())
    }

    fn byte_offset(&self, unit: u64) -> PenResult<u64> {
        unit.checked_mul(self.options.pad as u64)
            .ok_or_else(|| PenError::invalid_argument(format!("unit offset {} too large", unit)))
    }
}
