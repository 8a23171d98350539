//! JSON I/O handling for CLI
//!
//! - Output: one JSON object per line on stdout
//! - Input: raw record bytes on stdin for `append` without `--data`

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Read an entire record from stdin
pub fn read_payload() -> CliResult<Vec<u8>> {
    let mut payload = Vec::new();
    io::stdin().lock().read_to_end(&mut payload)?;
    Ok(payload)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &success(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout(), &failure(code, message))
}

fn success(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn failure(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
