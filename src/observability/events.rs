//! Observable events emitted by penlog stores
//!
//! Events are explicit and typed; the logger receives their string form.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Append log opened, cursor seeded from file length
    AppendLogOpen,
    /// Append log cut back to a unit boundary
    AppendLogTruncate,
    /// Scan hit a checksum mismatch and advanced by one unit
    ScanSkipUnit,
    /// Overwrite refused because the payload would not fit
    OverwriteRejected,
    /// Monotonic log opened
    MonotonicOpen,
    /// Monotonic log truncated at an ID
    MonotonicTruncate,
    /// Monotonic append failed after reserving its ID
    MonotonicAppendAbandoned,
    /// Offset cursor unreadable, default used instead
    OffsetCursorReset,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::AppendLogOpen => "APPEND_LOG_OPEN",
            Event::AppendLogTruncate => "APPEND_LOG_TRUNCATE",
            Event::ScanSkipUnit => "SCAN_SKIP_UNIT",
            Event::OverwriteRejected => "OVERWRITE_REJECTED",
            Event::MonotonicOpen => "MONOTONIC_OPEN",
            Event::MonotonicTruncate => "MONOTONIC_TRUNCATE",
            Event::MonotonicAppendAbandoned => "MONOTONIC_APPEND_ABANDONED",
            Event::OffsetCursorReset => "OFFSET_CURSOR_RESET",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
