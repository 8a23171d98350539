//! Checksum hashing
//!
//! xxh64 with a fixed seed of 0. The 32-bit variant is the low half of the
//! 64-bit result and is what the variable header embeds.

use xxhash_rust::xxh64::xxh64;

const SEED: u64 = 0;

/// Hashes `data` to 64 bits. Deterministic across processes and platforms.
pub fn hash64(data: &[u8]) -> u64 {
    xxh64(data, SEED)
}

/// Low 32 bits of [`hash64`].
pub fn hash32(data: &[u8]) -> u32 {
    hash64(data) as u32
}
