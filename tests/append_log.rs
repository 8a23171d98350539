//! Padded append log integration tests
//!
//! Round trips across payload sizes and padding units, corruption
//! detection, tolerant scanning and concurrent producers.

use penlog::append::{AppendLog, AppendReader};
use penlog::{ErrorCode, LogOptions, PenResult};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn payload_of(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn scan_all(log: &AppendLog, from: u64) -> Vec<(u64, Vec<u8>)> {
    let mut seen = Vec::new();
    log.scan(from, |payload, unit, _| -> PenResult<()> {
        seen.push((unit, payload.to_vec()));
        Ok(())
    })
    .unwrap();
    seen
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_round_trip_payload_lengths() {
    let temp_dir = create_temp_dir();

    // A small block size forces the second read for most records.
    for options in [LogOptions::default(), LogOptions::default().with_block_size(32)] {
        let path = temp_dir.path().join(format!("lengths-{}", options.block_size));
        let log = AppendLog::open(&path, options).unwrap();

        let mut written = Vec::new();
        for len in 0..600 {
            let data = payload_of(len);
            let (unit, next) = log.append(&data).unwrap();
            written.push((unit, next, data));
        }

        for (unit, next, data) in &written {
            let (read, read_next) = log.read(*unit).unwrap();
            assert_eq!(&read, data);
            assert_eq!(read_next, *next);
        }
    }
}

#[test]
fn test_round_trip_every_pad() {
    let temp_dir = create_temp_dir();

    for pad in 1..=64u32 {
        let path = temp_dir.path().join(format!("pad-{}", pad));
        let log = AppendLog::open(&path, LogOptions::default().with_pad(pad)).unwrap();

        let mut written = Vec::new();
        for len in [0usize, 1, 7, 48, 63, 64, 65, 200] {
            let data = payload_of(len);
            let (unit, next) = log.append(&data).unwrap();
            assert_eq!(next - unit, (16 + len as u64 + pad as u64 - 1) / pad as u64);
            written.push((unit, data));
        }

        for (unit, data) in &written {
            assert_eq!(&log.read(*unit).unwrap().0, data, "pad {}", pad);
        }
        assert_eq!(scan_all(&log, 0), written, "pad {}", pad);
    }
}

#[test]
fn test_hello_world_layout() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("hello");
    let log = AppendLog::open(&path, LogOptions::default()).unwrap();

    assert_eq!(log.append(b"hello world").unwrap(), (0, 1));
    log.sync().unwrap();

    let contents = fs::read(&path).unwrap();
    assert_eq!(contents.len(), 16 + 11);
    assert_eq!(&contents[0..4], &11u32.to_le_bytes());
    assert_eq!(&contents[8..12], &[0x0B, 0x0E, 0x0E, 0x0F]);
    assert_eq!(&contents[16..], b"hello world");
}

#[test]
fn test_custom_magic_isolates_logs() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("magic");
    let options = LogOptions::default().with_magic(*b"PENL");

    let log = AppendLog::open(&path, options).unwrap();
    log.append(b"tagged").unwrap();
    drop(log);

    let reader = AppendReader::open(&path, LogOptions::default()).unwrap();
    assert_eq!(reader.read(0).unwrap_err().code(), ErrorCode::ChecksumMismatch);

    let reader = AppendReader::open(&path, options).unwrap();
    assert_eq!(reader.read(0).unwrap().0, b"tagged");
}

// =============================================================================
// Corruption Detection
// =============================================================================

#[test]
fn test_zero_filled_file() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("zeros");
    fs::write(&path, vec![0u8; 1024]).unwrap();

    let log = AppendLog::open(&path, LogOptions::default()).unwrap();
    assert_eq!(log.read(0).unwrap_err().code(), ErrorCode::ChecksumMismatch);
    assert!(scan_all(&log, 0).is_empty());

    assert_eq!(log.next_unit(), 16);
    let (unit, _) = log.append(b"after zeros").unwrap();
    assert_eq!(unit, 16);
    assert_eq!(scan_all(&log, 0), vec![(16, b"after zeros".to_vec())]);
}

#[test]
fn test_any_flipped_byte_in_last_record_is_detected() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("flip");
    let (first, last) = {
        let log = AppendLog::open(&path, LogOptions::default()).unwrap();
        let first = log.append(b"untouched record").unwrap().0;
        let last = log.append(b"last record payload").unwrap().0;
        log.sync().unwrap();
        (first, last)
    };
    let original = fs::read(&path).unwrap();
    let start = (last * 64) as usize;

    for i in start..original.len() {
        let mut contents = original.clone();
        contents[i] ^= 0x40;
        fs::write(&path, &contents).unwrap();

        let reader = AppendReader::open(&path, LogOptions::default()).unwrap();
        let err = reader.read(last).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ChecksumMismatch, "byte {}", i);
        assert_eq!(reader.read(first).unwrap().0, b"untouched record");

        let mut seen = 0;
        reader
            .scan(last, |_, _, _| -> PenResult<()> {
                seen += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, 0, "byte {}", i);

        let mut from_start = Vec::new();
        reader
            .scan(first, |payload, unit, _| -> PenResult<()> {
                from_start.push((unit, payload.to_vec()));
                Ok(())
            })
            .unwrap();
        assert_eq!(
            from_start,
            vec![(first, b"untouched record".to_vec())],
            "byte {}",
            i
        );
    }
}

#[test]
fn test_truncated_payload_is_short_read() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("torn");
    {
        let log = AppendLog::open(&path, LogOptions::default()).unwrap();
        log.append(&payload_of(5000)).unwrap();
    }

    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..4500]).unwrap();

    let reader = AppendReader::open(&path, LogOptions::default()).unwrap();
    assert_eq!(reader.read(0).unwrap_err().code(), ErrorCode::ShortRead);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_producers_with_reader() {
    let temp_dir = create_temp_dir();
    let log = Arc::new(
        AppendLog::open(&temp_dir.path().join("concurrent"), LogOptions::default().with_pad(8))
            .unwrap(),
    );

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let mut mine = Vec::new();
                for i in 0..150 {
                    let data = format!("producer {} record {}", t, i).into_bytes();
                    let (unit, _) = log.append(&data).unwrap();
                    mine.push((unit, data));
                }
                mine
            })
        })
        .collect();

    let mut expected: Vec<(u64, Vec<u8>)> =
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    expected.sort();

    let reader = log.reader().unwrap();
    for (unit, data) in &expected {
        assert_eq!(&reader.read(*unit).unwrap().0, data);
    }
    assert_eq!(scan_all(&log, 0), expected);
}
