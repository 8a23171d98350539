//! Positional reads and corruption-tolerant scans of a padded append log

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::codec::decode_variable;
use crate::config::LogOptions;
use crate::errors::{PenError, PenResult};
use crate::observability::{Event, Logger, Severity};
use crate::positional::PositionalRead;

/// Reads the record at `unit`, returning its payload and the unit offset of
/// the record that follows it.
pub fn read_record<R: PositionalRead + ?Sized>(
    reader: &R,
    unit: u64,
    options: &LogOptions,
) -> PenResult<(Vec<u8>, u64)> {
    let byte_offset = unit
        .checked_mul(options.pad as u64)
        .ok_or_else(|| PenError::invalid_argument(format!("unit offset {} too large", unit)))?;

    let (payload, units) = decode_variable(
        reader,
        byte_offset,
        options.block_size,
        &options.magic,
        options.pad,
    )?;

    Ok((payload, unit + units))
}

/// Calls `callback(payload, unit, next_unit)` for every valid record from
/// `from_unit` onwards.
///
/// Checksum mismatches advance the scan by exactly one unit. A short read
/// ends the scan with `Ok(())`. Any other error, or an error returned by the
/// callback, stops the scan and is returned.
pub fn scan_records<R, F, E>(
    reader: &R,
    from_unit: u64,
    options: &LogOptions,
    mut callback: F,
) -> Result<(), E>
where
    R: PositionalRead + ?Sized,
    F: FnMut(&[u8], u64, u64) -> Result<(), E>,
    E: From<PenError>,
{
    let mut unit = from_unit;
    loop {
        match read_record(reader, unit, options) {
            Ok((payload, next)) => {
                callback(&payload, unit, next)?;
                unit = next;
            }
            Err(e) if e.is_checksum_mismatch() => {
                if Logger::enabled(Severity::Trace) {
                    let unit_str = unit.to_string();
                    Logger::trace(
                        Event::ScanSkipUnit,
                        &[("unit", unit_str.as_str()), ("reason", e.message())],
                    );
                }
                unit += 1;
            }
            Err(e) if e.is_short_read() => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read-only handle on a padded append log.
///
/// Safe to share between threads; every read is positional.
#[derive(Debug)]
pub struct AppendReader {
    path: Option<PathBuf>,
    file: File,
    options: LogOptions,
}

impl AppendReader {
    /// Opens an existing log file for reading.
    ///
    /// A missing file is reported as an I/O error with kind `NotFound`.
    pub fn open(path: &Path, options: LogOptions) -> PenResult<Self> {
        options.validate()?;

        let file = OpenOptions::new().read(true).open(path).map_err(|e| {
            PenError::io(format!("Failed to open append log: {}", path.display()), e)
        })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file,
            options,
        })
    }

    /// Wraps an already opened, readable file
    pub fn from_file(file: File, options: LogOptions) -> PenResult<Self> {
        options.validate()?;
        Ok(Self {
            path: None,
            file,
            options,
        })
    }

    /// Path of the log file, when opened by path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Options this reader decodes with
    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Current file length in bytes
    pub fn len_bytes(&self) -> PenResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| PenError::io("Failed to read append log metadata", e))
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
}
