//! Error types shared by every penlog store
//!
//! Error codes:
//! - PEN_CHECKSUM_MISMATCH - magic or hash validation failed
//! - PEN_SHORT_READ - not enough bytes remain (end of data)
//! - PEN_INVALID_ARGUMENT - bad configuration or payload size
//! - PEN_OVERFLOW - overwrite record larger than the reserved padded footprint
//! - PEN_OUT_OF_RANGE - ID beyond the current count
//! - PEN_EMPTY - `last()` on an empty log
//! - PEN_IO_ERROR - underlying storage failure

use std::fmt;
use std::io;

/// Closed set of failure kinds.
///
/// Callers match on [`PenError::code`] rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Magic or checksum validation failed. Either corruption or a record
    /// whose concurrent write has not completed yet.
    ChecksumMismatch,
    /// Fewer bytes remain than the record needs
    ShortRead,
    /// Invalid configuration or payload
    InvalidArgument,
    /// Overwrite record exceeds the padded footprint at its offset
    Overflow,
    /// ID lookup beyond the current count
    OutOfRange,
    /// No records
    Empty,
    /// Underlying storage error
    Io,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::ChecksumMismatch => "PEN_CHECKSUM_MISMATCH",
            ErrorCode::ShortRead => "PEN_SHORT_READ",
            ErrorCode::InvalidArgument => "PEN_INVALID_ARGUMENT",
            ErrorCode::Overflow => "PEN_OVERFLOW",
            ErrorCode::OutOfRange => "PEN_OUT_OF_RANGE",
            ErrorCode::Empty => "PEN_EMPTY",
            ErrorCode::Io => "PEN_IO_ERROR",
        }
    }

    /// Whether a caller may skip or retry past this error.
    ///
    /// Scans do this automatically for checksum mismatches and short reads.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::ChecksumMismatch | ErrorCode::ShortRead)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error type with code, message and optional context
#[derive(Debug)]
pub struct PenError {
    code: ErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl PenError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Checksum or magic mismatch at a byte offset
    pub fn checksum_mismatch(byte_offset: u64, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChecksumMismatch, reason)
            .with_details(format!("byte_offset: {}", byte_offset))
    }

    /// Not enough bytes at a byte offset
    pub fn short_read(byte_offset: u64, wanted: usize, got: usize) -> Self {
        Self::new(
            ErrorCode::ShortRead,
            format!("wanted {} bytes, got {}", wanted, got),
        )
        .with_details(format!("byte_offset: {}", byte_offset))
    }

    /// Invalid argument or configuration
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Overwrite record larger than the padded footprint it replaces
    pub fn overflow(unit_offset: u64, reserved_units: u64, requested_units: u64) -> Self {
        Self::new(
            ErrorCode::Overflow,
            format!(
                "record needs {} units but only {} are reserved",
                requested_units, reserved_units
            ),
        )
        .with_details(format!("unit_offset: {}", unit_offset))
    }

    /// ID beyond current count
    pub fn out_of_range(id: u64, count: u64) -> Self {
        Self::new(
            ErrorCode::OutOfRange,
            format!("id {} out of range, count is {}", id, count),
        )
    }

    /// Empty log
    pub fn empty() -> Self {
        Self::new(ErrorCode::Empty, "log is empty")
    }

    /// Underlying I/O failure; the `io::Error` stays reachable as `source()`
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ErrorCode::Io,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Kind of the wrapped I/O error, if any
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        self.source.as_ref().map(|e| e.kind())
    }

    pub fn is_checksum_mismatch(&self) -> bool {
        self.code == ErrorCode::ChecksumMismatch
    }

    pub fn is_short_read(&self) -> bool {
        self.code == ErrorCode::ShortRead
    }
}

impl fmt::Display for PenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for PenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for penlog operations
pub type PenResult<T> = Result<T, PenError>;
