//! Fixed-width record format
//!
//! ```text
//! +---------------------+
//! | hash64(payload)     | (u64 LE)
//! +---------------------+
//! | payload             | (fixed_size bytes)
//! +---------------------+
//! ```

use super::hash::hash64;
use crate::errors::{PenError, PenResult};

/// Size of the fixed record header in bytes
pub const FIXED_HEADER_SIZE: usize = 8;

/// Encodes `payload` with its 64-bit checksum prepended.
pub fn encode_fixed(payload: &[u8]) -> Vec<u8> {
    let mut block = Vec::with_capacity(FIXED_HEADER_SIZE + payload.len());
    block.extend_from_slice(&hash64(payload).to_le_bytes());
    block.extend_from_slice(payload);
    block
}

/// Verifies a fixed record and returns its payload.
///
/// The payload is everything after the header, so `block` must be exactly
/// one slot long.
pub fn decode_fixed(block: &[u8]) -> PenResult<&[u8]> {
    if block.len() < FIXED_HEADER_SIZE {
        return Err(PenError::short_read(0, FIXED_HEADER_SIZE, block.len()));
    }

    let (header, payload) = block.split_at(FIXED_HEADER_SIZE);
    let mut stored = [0u8; FIXED_HEADER_SIZE];
    stored.copy_from_slice(header);
    let stored = u64::from_le_bytes(stored);
    let computed = hash64(payload);

    if stored != computed {
        return Err(PenError::checksum_mismatch(
            0,
            format!(
                "fixed record checksum mismatch: computed {:016x}, stored {:016x}",
                computed, stored
            ),
        ));
    }

    Ok(payload)
}
