//! Store configuration
//!
//! A JSON file may override any subset of the defaults:
//!
//! ```json
//! { "pad": 64, "magic": [11, 14, 14, 15], "block_size": 4096 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{DEFAULT_MAGIC, VARIABLE_HEADER_SIZE};
use crate::errors::{PenError, PenResult};

/// Default padding unit in bytes
pub const DEFAULT_PAD: u32 = 64;

/// Default read block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Options for padded append logs and everything built on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    /// Padding unit in bytes; record addresses are multiples of it
    #[serde(default = "default_pad")]
    pub pad: u32,

    /// Magic bytes embedded in every variable record header
    #[serde(default = "default_magic")]
    pub magic: [u8; 4],

    /// Bytes fetched by the first read of a record. Records whose header and
    /// payload fit need a single read.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

fn default_pad() -> u32 {
    DEFAULT_PAD
}
fn default_magic() -> [u8; 4] {
    DEFAULT_MAGIC
}
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            pad: DEFAULT_PAD,
            magic: DEFAULT_MAGIC,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl LogOptions {
    /// Returns a copy with a different padding unit
    pub fn with_pad(mut self, pad: u32) -> Self {
        self.pad = pad;
        self
    }

    /// Returns a copy with different magic bytes
    pub fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    /// Returns a copy with a different first-read block size
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Load options from a JSON file and validate them
    pub fn load(path: &Path) -> PenResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PenError::io(format!("Failed to read config: {}", path.display()), e)
        })?;

        let options: LogOptions = serde_json::from_str(&content)
            .map_err(|e| PenError::invalid_argument(format!("Invalid config JSON: {}", e)))?;

        options.validate()?;

        Ok(options)
    }

    /// Checks the invariants every store relies on
    pub fn validate(&self) -> PenResult<()> {
        if self.pad == 0 {
            return Err(PenError::invalid_argument("pad must be >= 1"));
        }

        if self.block_size < VARIABLE_HEADER_SIZE {
            return Err(PenError::invalid_argument(format!(
                "block_size must be >= {}, got {}",
                VARIABLE_HEADER_SIZE, self.block_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = LogOptions::default();
        assert_eq!(options.pad, 64);
        assert_eq!(options.magic, [0x0B, 0x0E, 0x0E, 0x0F]);
        assert_eq!(options.block_size, 4096);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_pad_rejected() {
        let err = LogOptions::default().with_pad(0).validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_small_block_size_rejected() {
        let err = LogOptions::default()
            .with_block_size(15)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(LogOptions::default().with_block_size(16).validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("penlog.json");
        fs::write(&path, r#"{"pad": 16}"#).unwrap();

        let options = LogOptions::load(&path).unwrap();
        assert_eq!(options.pad, 16);
        assert_eq!(options.magic, DEFAULT_MAGIC);
        assert_eq!(options.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_load_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("penlog.json");
        fs::write(&path, r#"{"block_size": 4}"#).unwrap();

        let err = LogOptions::load(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = LogOptions::load(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Io);
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}
