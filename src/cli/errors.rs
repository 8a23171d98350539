//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::errors::PenError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Store operation failed
    #[error(transparent)]
    Store(#[from] PenError),

    /// Response could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// stdin/stdout failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Store(e) => e.code().code(),
            CliError::Json(_) => "PEN_CLI_JSON_ERROR",
            CliError::Io(_) => "PEN_CLI_IO_ERROR",
        }
    }

    /// Get the error message without the code prefix
    pub fn message(&self) -> String {
        match self {
            CliError::Store(e) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}
