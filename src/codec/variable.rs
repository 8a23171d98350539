//! Variable-length record format
//!
//! ```text
//! +------------------------+
//! | payload length         | (u32 LE)
//! +------------------------+
//! | hash32(payload)        | (u32 LE)
//! +------------------------+
//! | magic                  | ([u8; 4])
//! +------------------------+
//! | hash32(bytes 0..12)    | (u32 LE)
//! +------------------------+
//! | payload                | (length bytes)
//! +------------------------+
//! ```
//!
//! Records are placed at padded offsets; a record's footprint is
//! `ceil((16 + length) / pad)` units.

use super::hash::hash32;
use crate::errors::{PenError, PenResult};
use crate::positional::PositionalRead;

/// Size of the variable record header in bytes
pub const VARIABLE_HEADER_SIZE: usize = 16;

/// Default magic bytes. Writer and reader must agree on them.
pub const DEFAULT_MAGIC: [u8; 4] = [0x0B, 0x0E, 0x0E, 0x0F];

/// Decoded, checksum-verified variable record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Payload length in bytes
    pub length: u32,
    /// Low 32 bits of the payload hash
    pub payload_checksum: u32,
}

impl RecordHeader {
    /// Header plus payload size in bytes
    pub fn encoded_len(&self) -> u64 {
        VARIABLE_HEADER_SIZE as u64 + self.length as u64
    }
}

/// Number of `pad`-byte units needed for `encoded_len` bytes.
pub fn padded_units(encoded_len: u64, pad: u32) -> u64 {
    let pad = pad as u64;
    (encoded_len + pad - 1) / pad
}

/// Encodes `payload` with a 16-byte header.
///
/// Fails with `InvalidArgument` if the payload length does not fit in a u32.
pub fn encode_variable(payload: &[u8], magic: &[u8; 4]) -> PenResult<Vec<u8>> {
    let length = u32::try_from(payload.len()).map_err(|_| {
        PenError::invalid_argument(format!(
            "payload of {} bytes exceeds the u32 length field",
            payload.len()
        ))
    })?;

    let mut blob = Vec::with_capacity(VARIABLE_HEADER_SIZE + payload.len());
    blob.extend_from_slice(&length.to_le_bytes());
    blob.extend_from_slice(&hash32(payload).to_le_bytes());
    blob.extend_from_slice(magic);
    let header_checksum = hash32(&blob[..12]);
    blob.extend_from_slice(&header_checksum.to_le_bytes());
    blob.extend_from_slice(payload);

    Ok(blob)
}

/// Validates magic and header checksum of the first 16 bytes of `bytes`.
///
/// `byte_offset` is only used for error context.
pub fn decode_header(bytes: &[u8], magic: &[u8; 4], byte_offset: u64) -> PenResult<RecordHeader> {
    if bytes.len() < VARIABLE_HEADER_SIZE {
        return Err(PenError::short_read(
            byte_offset,
            VARIABLE_HEADER_SIZE,
            bytes.len(),
        ));
    }

    if &bytes[8..12] != magic {
        return Err(PenError::checksum_mismatch(byte_offset, "bad magic"));
    }

    let stored = read_u32(&bytes[12..16]);
    let computed = hash32(&bytes[..12]);
    if stored != computed {
        return Err(PenError::checksum_mismatch(
            byte_offset,
            format!(
                "header checksum mismatch: computed {:08x}, stored {:08x}",
                computed, stored
            ),
        ));
    }

    Ok(RecordHeader {
        length: read_u32(&bytes[0..4]),
        payload_checksum: read_u32(&bytes[4..8]),
    })
}

/// Reads and verifies the record starting at `byte_offset`.
///
/// Issues one read of up to `block_size` bytes. When that block already
/// holds the whole payload no further I/O happens; otherwise exactly
/// `length` more bytes are read at the payload's offset. Returns the payload
/// and the record's footprint in `pad` units.
pub fn decode_variable<R: PositionalRead + ?Sized>(
    reader: &R,
    byte_offset: u64,
    block_size: usize,
    magic: &[u8; 4],
    pad: u32,
) -> PenResult<(Vec<u8>, u64)> {
    if block_size < VARIABLE_HEADER_SIZE {
        return Err(PenError::invalid_argument(format!(
            "block size {} is below the {} byte header",
            block_size, VARIABLE_HEADER_SIZE
        )));
    }
    if pad == 0 {
        return Err(PenError::invalid_argument("pad must be >= 1"));
    }

    let mut block = vec![0u8; block_size];
    let n = reader
        .read_at_most(&mut block, byte_offset)
        .map_err(|e| PenError::io(format!("read failed at byte {}", byte_offset), e))?;
    if n < VARIABLE_HEADER_SIZE {
        return Err(PenError::short_read(byte_offset, VARIABLE_HEADER_SIZE, n));
    }
    block.truncate(n);

    let header = decode_header(&block, magic, byte_offset)?;
    let length = header.length as usize;

    let payload = if VARIABLE_HEADER_SIZE + length <= block.len() {
        block.truncate(VARIABLE_HEADER_SIZE + length);
        block.split_off(VARIABLE_HEADER_SIZE)
    } else {
        let mut payload = vec![0u8; length];
        let payload_offset = byte_offset + VARIABLE_HEADER_SIZE as u64;
        let n = reader
            .read_at_most(&mut payload, payload_offset)
            .map_err(|e| PenError::io(format!("read failed at byte {}", payload_offset), e))?;
        if n < length {
            return Err(PenError::short_read(payload_offset, length, n));
        }
        payload
    };

    let computed = hash32(&payload);
    if computed != header.payload_checksum {
        return Err(PenError::checksum_mismatch(
            byte_offset,
            format!(
                "payload checksum mismatch: computed {:08x}, stored {:08x}",
                computed, header.payload_checksum
            ),
        ));
    }

    Ok((payload, padded_units(header.encoded_len(), pad)))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}
