//! Lock-scoped wrapper for sharing a monotonic log that is also truncated

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::log::MonotonicLog;
use crate::errors::{PenError, PenResult};

/// `MonotonicLog` behind a read/write lock.
///
/// Appends, reads and scans share the lock, so they still run concurrently.
/// `truncate_at` takes it exclusively and waits for them to drain.
#[derive(Debug)]
pub struct SharedMonotonicLog {
    inner: RwLock<MonotonicLog>,
}

impl SharedMonotonicLog {
    /// Wraps an open log
    pub fn new(log: MonotonicLog) -> Self {
        Self {
            inner: RwLock::new(log),
        }
    }

    /// Appends `payload` and returns its ID
    pub fn append(&self, payload: &[u8]) -> PenResult<u64> {
        self.shared().append(payload)
    }

    /// Reads the payload stored under `id`
    pub fn read(&self, id: u64) -> PenResult<Vec<u8>> {
        self.shared().read(id)
    }

    /// Reads the most recently appended payload
    pub fn last(&self) -> PenResult<Vec<u8>> {
        self.shared().last()
    }

    /// Number of IDs
    pub fn count(&self) -> PenResult<u64> {
        self.shared().count()
    }

    /// Scans from `from_id`; see [`MonotonicLog::scan`]
    pub fn scan<F, E>(&self, from_id: u64, callback: F) -> Result<(), E>
    where
        F: FnMut(u64, &[u8]) -> Result<(), E>,
        E: From<PenError>,
    {
        self.shared().scan(from_id, callback)
    }

    /// Discards every ID `>= n` under the exclusive lock
    pub fn truncate_at(&self, n: u64) -> PenResult<()> {
        self.exclusive().truncate_at(n)
    }

    /// Flushes data and index files
    pub fn sync(&self) -> PenResult<()> {
        self.shared().sync()
    }

    /// Unwraps the log
    pub fn into_inner(self) -> MonotonicLog {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // A panicking holder leaves nothing half-updated in memory that the
    // files do not also describe, so poisoning is ignored.
    fn shared(&self) -> RwLockReadGuard<'_, MonotonicLog> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, MonotonicLog> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<MonotonicLog> for SharedMonotonicLog {
    fn from(log: MonotonicLog) -> Self {
        Self::new(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogOptions;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn open_shared(temp_dir: &TempDir) -> SharedMonotonicLog {
        MonotonicLog::open(&temp_dir.path().join("shared"), LogOptions::default())
            .unwrap()
            .into()
    }

    #[test]
    fn test_append_and_truncate_through_shared_ref() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_shared(&temp_dir);

        for i in 0..6u64 {
            assert_eq!(log.append(&i.to_le_bytes()).unwrap(), i);
        }
        log.truncate_at(3).unwrap();
        assert_eq!(log.count().unwrap(), 3);
        assert_eq!(log.last().unwrap(), 2u64.to_le_bytes());
        assert_eq!(log.append(b"next").unwrap(), 3);
    }

    #[test]
    fn test_truncate_while_appending() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(open_shared(&temp_dir));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        log.append(format!("{}:{}", t, i).as_bytes()).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..5 {
            let count = log.count().unwrap();
            log.truncate_at(count / 2).unwrap();
        }
        for w in writers {
            w.join().unwrap();
        }

        let count = log.count().unwrap();
        let mut seen = 0;
        log.scan(0, |_, payload| -> PenResult<()> {
            assert!(payload.contains(&b':'));
            seen += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, count);
    }
}
