//! Property tests over arbitrary payloads, padding units and truncation points

use penlog::codec::{decode_fixed, decode_variable, encode_fixed, encode_variable, DEFAULT_MAGIC};
use penlog::{AppendLog, LogOptions, MonotonicLog, PenResult};
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn variable_record_roundtrip(
        payload in prop::collection::vec(any::<u8>(), 0..2000),
        block_size in 16usize..4096,
        pad in 1u32..=64,
    ) {
        let blob = encode_variable(&payload, &DEFAULT_MAGIC).unwrap();
        let (decoded, units) = decode_variable(&blob, 0, block_size, &DEFAULT_MAGIC, pad).unwrap();

        prop_assert_eq!(decoded, payload.clone());
        prop_assert_eq!(units, (16 + payload.len() as u64 + pad as u64 - 1) / pad as u64);
    }

    #[test]
    fn fixed_record_roundtrip(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let block = encode_fixed(&payload);
        prop_assert_eq!(decode_fixed(&block).unwrap(), payload.as_slice());
    }

    #[test]
    fn append_log_scan_returns_every_record(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..40),
        pad in 1u32..=64,
    ) {
        let temp_dir = TempDir::new().unwrap();
        let log = AppendLog::open(
            &temp_dir.path().join("props"),
            LogOptions::default().with_pad(pad),
        )
        .unwrap();

        let mut units = Vec::new();
        for payload in &payloads {
            units.push(log.append(payload).unwrap().0);
        }

        let mut scanned = Vec::new();
        log.scan(0, |payload, unit, _| -> PenResult<()> {
            scanned.push((unit, payload.to_vec()));
            Ok(())
        })
        .unwrap();

        let expected: Vec<(u64, Vec<u8>)> = units.into_iter().zip(payloads).collect();
        prop_assert_eq!(scanned, expected);
    }

    #[test]
    fn monotonic_truncate_then_append(k in 1u64..30, cut in 0u64..30) {
        let n = cut % (k + 1);
        let temp_dir = TempDir::new().unwrap();
        let mut log = MonotonicLog::open(&temp_dir.path().join("props"), LogOptions::default())
            .unwrap();

        for id in 0..k {
            log.append(&id.to_le_bytes()).unwrap();
        }
        log.truncate_at(n).unwrap();

        prop_assert_eq!(log.count().unwrap(), n);
        for id in 0..n {
            prop_assert_eq!(log.read(id).unwrap(), id.to_le_bytes().to_vec());
        }
        prop_assert_eq!(log.append(b"again").unwrap(), n);
        prop_assert_eq!(log.read(n).unwrap(), b"again".to_vec());
    }
}
