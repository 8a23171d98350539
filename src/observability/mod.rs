//! Observability for penlog
//!
//! Structured, synchronous JSON logging of store lifecycle events:
//! one log line = one event, `event` first, `severity` second, other fields
//! sorted by key. Hot-path events are logged at TRACE and are filtered out
//! unless the minimum severity is lowered.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
