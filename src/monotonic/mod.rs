//! Monotonic ID-indexed log
//!
//! Composes a fixed slot store (`<base>.index`, one 8-byte unit offset per
//! ID) with a padded append log (`<base>.data`).
//!
//! ```text
//! id ──► index slot ──► data unit offset ──► payload
//! ```
//!
//! Appends are lock-free: an atomic ID counter plus the data log's bump
//! pointer. Truncation needs exclusive access, which `&mut self` enforces;
//! use [`SharedMonotonicLog`] when a shared log must also be truncated.

mod log;
mod shared;

pub use log::MonotonicLog;
pub use shared::SharedMonotonicLog;
