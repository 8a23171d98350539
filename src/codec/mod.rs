//! Record codec shared by every penlog file format
//!
//! Two header widths exist:
//!
//! ```text
//! fixed (8 bytes):      | u64 hash64(payload) | payload[fixed_size] |
//!
//! variable (16 bytes):  | u32 len | u32 hash32(payload) | [u8;4] magic | u32 hash32(header[0..12]) | payload[len] |
//! ```
//!
//! All integers are little-endian. The variable header carries its own
//! checksum so that a corrupted length field is rejected before it is used
//! to size the payload read.

mod fixed;
mod hash;
mod variable;

pub use fixed::{decode_fixed, encode_fixed, FIXED_HEADER_SIZE};
pub use hash::{hash32, hash64};
pub use variable::{
    decode_header, decode_variable, encode_variable, padded_units, RecordHeader,
    DEFAULT_MAGIC, VARIABLE_HEADER_SIZE,
};
