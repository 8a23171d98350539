//! Monotonic log: dense IDs over an index store and a padded data log

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::append::AppendLog;
use crate::codec::padded_units;
use crate::config::LogOptions;
use crate::errors::{PenError, PenResult};
use crate::fixed::FixedStore;
use crate::observability::{Event, Logger, Severity};

const INDEX_SUFFIX: &str = ".index";
const DATA_SUFFIX: &str = ".data";
const INDEX_ENTRY_SIZE: usize = 8;

/// Append-only record log addressed by zero-based, sequential IDs.
///
/// `<base>.index` holds one fixed slot per ID with the record's unit offset
/// in `<base>.data`. The data record is always written before its index
/// slot, so a crash between the two leaves an unreferenced data record and
/// no dangling ID.
#[derive(Debug)]
pub struct MonotonicLog {
    index: FixedStore,
    data: AppendLog,
    next_id: AtomicU64,
}

impl MonotonicLog {
    /// Opens or creates `<base>.index` and `<base>.data`.
    pub fn open(base: &Path, options: LogOptions) -> PenResult<Self> {
        options.validate()?;

        let index = FixedStore::open(&with_suffix(base, INDEX_SUFFIX), INDEX_ENTRY_SIZE)?;
        let data = AppendLog::open(&with_suffix(base, DATA_SUFFIX), options)?;
        let log = Self::from_parts(index, data)?;

        let base_str = base.display().to_string();
        let count_str = log.next_id().to_string();
        Logger::info(
            Event::MonotonicOpen,
            &[("base", base_str.as_str()), ("count", count_str.as_str())],
        );

        Ok(log)
    }

    /// Wraps already opened index and data files. Both must be readable and
    /// writable.
    pub fn from_files(index_file: File, data_file: File, options: LogOptions) -> PenResult<Self> {
        let index = FixedStore::from_file(index_file, INDEX_ENTRY_SIZE);
        let data = AppendLog::from_file(data_file, options)?;
        Self::from_parts(index, data)
    }

    fn from_parts(index: FixedStore, data: AppendLog) -> PenResult<Self> {
        let count = index.slot_count()?;
        Ok(Self {
            index,
            data,
            next_id: AtomicU64::new(count),
        })
    }

    /// Path of the index file, when opened by path
    pub fn index_path(&self) -> Option<&Path> {
        self.index.path()
    }

    /// Path of the data file, when opened by path
    pub fn data_path(&self) -> Option<&Path> {
        self.data.path()
    }

    /// Options the data log is encoded with
    pub fn options(&self) -> &LogOptions {
        self.data.options()
    }

    /// ID the next append will receive, absent concurrent appends
    pub fn next_id(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    /// Number of IDs, i.e. whole slots in the index file.
    ///
    /// While appends are in flight this can run ahead of IDs whose index
    /// slot is not written yet; reading such an ID fails with
    /// `ChecksumMismatch` until its append completes.
    pub fn count(&self) -> PenResult<u64> {
        self.index.slot_count()
    }

    /// Appends `payload` and returns its ID. Not synced.
    ///
    /// When a write fails the reserved ID is handed back if no later ID has
    /// been reserved yet. Otherwise its slot is filled with an empty record
    /// so IDs stay dense; only if that also fails does the slot stay
    /// unwritten, reading as `ChecksumMismatch`.
    pub fn append(&self, payload: &[u8]) -> PenResult<u64> {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let written = self
            .data
            .append(payload)
            .and_then(|(unit, _)| self.index.write_at(id, &unit.to_le_bytes()));

        match written {
            Ok(()) => Ok(id),
            Err(e) => {
                self.abandon(id, &e);
                Err(e)
            }
        }
    }

    fn abandon(&self, id: u64, cause: &PenError) {
        let released = self
            .next_id
            .compare_exchange(id + 1, id, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        let (severity, outcome) = if released {
            (Severity::Warn, "released")
        } else {
            let filled = self
                .data
                .append(&[])
                .and_then(|(unit, _)| self.index.write_at(id, &unit.to_le_bytes()));
            match filled {
                Ok(()) => (Severity::Warn, "filled"),
                Err(_) => (Severity::Error, "unwritten"),
            }
        };

        let id_str = id.to_string();
        let cause_str = cause.to_string();
        Logger::log(
            severity,
            Event::MonotonicAppendAbandoned,
            &[
                ("id", id_str.as_str()),
                ("outcome", outcome),
                ("error", cause_str.as_str()),
            ],
        );
    }

    /// Reads the payload stored under `id`.
    pub fn read(&self, id: u64) -> PenResult<Vec<u8>> {
        let count = self.count()?;
        if id >= count {
            return Err(PenError::out_of_range(id, count));
        }
        let unit = self.data_unit(id)?;
        self.data.read(unit).map(|(payload, _)| payload)
    }

    /// Reads the most recently appended payload.
    pub fn last(&self) -> PenResult<Vec<u8>> {
        match self.count()? {
            0 => Err(PenError::empty()),
            count => self.read(count - 1),
        }
    }

    /// Calls `callback(id, payload)` for every ID from `from_id` to the
    /// current count, in order.
    ///
    /// IDs are dense, so unlike a raw append log scan nothing is skipped:
    /// any read error stops the scan and is returned.
    pub fn scan<F, E>(&self, from_id: u64, mut callback: F) -> Result<(), E>
    where
        F: FnMut(u64, &[u8]) -> Result<(), E>,
        E: From<PenError>,
    {
        let count = self.count()?;
        for id in from_id..count {
            let payload = self.read(id)?;
            callback(id, &payload)?;
        }
        Ok(())
    }

    /// Discards every ID `>= n`.
    ///
    /// The next append receives ID `n` and reuses the data space of the
    /// record that was stored under it.
    pub fn truncate_at(&mut self, n: u64) -> PenResult<()> {
        let count = self.count()?;
        if n > count {
            return Err(PenError::out_of_range(n, count));
        }
        if n == count {
            return Ok(());
        }

        let (data_end, next_unit) = self.data_cut(n)?;

        self.index.truncate(n)?;
        self.data.truncate_to(data_end, next_unit)?;
        *self.next_id.get_mut() = n;

        let n_str = n.to_string();
        let count_str = count.to_string();
        let unit_str = next_unit.to_string();
        Logger::info(
            Event::MonotonicTruncate,
            &[
                ("at", n_str.as_str()),
                ("previous_count", count_str.as_str()),
                ("next_unit", unit_str.as_str()),
            ],
        );
        Ok(())
    }

    /// Flushes the data file, then the index file.
    ///
    /// Both are attempted; the first failure is returned.
    pub fn sync(&self) -> PenResult<()> {
        let data = self.data.sync();
        let index = self.index.sync();
        data.and(index)
    }

    /// Works out where to cut the data file when IDs `>= n` go away.
    ///
    /// Returns the new data length in bytes and the next append unit.
    /// Normally that is the end of the boundary record (ID `n`) and its
    /// unit, so the next append reuses its space. Concurrent appends can
    /// store a kept ID's record after the boundary record; the cut then
    /// moves past the last kept record instead. Only `index[0..n]` and
    /// `index[n]` are consulted, and an unreadable boundary falls back to
    /// the kept records alone.
    fn data_cut(&self, n: u64) -> PenResult<(u64, u64)> {
        let pad = self.data.options().pad;
        let byte_offset = |unit: u64| {
            unit.checked_mul(pad as u64).ok_or_else(|| {
                PenError::invalid_argument(format!("unit offset {} too large", unit))
            })
        };

        let boundary = match self
            .data_unit(n)
            .and_then(|unit| self.data.read_header(unit).map(|header| (unit, header)))
        {
            Ok(found) => Some(found),
            Err(e) if e.is_checksum_mismatch() || e.is_short_read() => None,
            Err(e) => return Err(e),
        };

        // Unreadable kept slots are skipped; their records are lost already.
        let mut last_kept: Option<u64> = None;
        self.index.for_each_slot(0..n, |_, slot| {
            if let Ok(payload) = slot {
                let unit = decode_unit(payload);
                if last_kept.map_or(true, |last| unit > last) {
                    last_kept = Some(unit);
                }
            }
        })?;

        if let Some((unit, header)) = boundary {
            if last_kept.map_or(true, |kept| kept < unit) {
                return Ok((byte_offset(unit)? + header.encoded_len(), unit));
            }
        }

        match last_kept {
            None => Ok((0, 0)),
            Some(unit) => match self.data.read_header(unit) {
                Ok(header) => Ok((
                    byte_offset(unit)? + header.encoded_len(),
                    unit + padded_units(header.encoded_len(), pad),
                )),
                Err(e) if e.is_checksum_mismatch() || e.is_short_read() => {
                    Ok((byte_offset(unit)?, unit))
                }
                Err(e) => Err(e),
            },
        }
    }

    fn data_unit(&self, id: u64) -> PenResult<u64> {
        let slot = self.index.read_at(id)?;
        Ok(decode_unit(&slot))
    }
}

fn decode_unit(slot: &[u8]) -> u64 {
    let mut buf = [0u8; INDEX_ENTRY_SIZE];
    buf.copy_from_slice(&slot[..INDEX_ENTRY_SIZE]);
    u64::from_le_bytes(buf)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
