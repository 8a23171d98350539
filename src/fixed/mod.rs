//! Fixed slot store
//!
//! A file holding an array of equal-size, independently checksummed slots.
//! Slot `i` lives at byte `i * (8 + fixed_size)`. Slots are never moved;
//! the file only grows at the tail or is truncated from it.

mod store;

pub use store::{slot_count_for, FixedStore};
