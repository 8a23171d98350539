//! CLI command implementations
//!
//! Each command opens the store it needs, performs one operation and
//! returns the response payload. Mutating commands sync before returning.

use std::path::Path;

use serde_json::{json, Value};

use crate::append::AppendReader;
use crate::config::LogOptions;
use crate::cursor::OffsetCursor;
use crate::monotonic::MonotonicLog;
use crate::observability::{Logger, Severity};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_payload, write_error, write_response};

/// Parse arguments, run the command and print its response
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    // stdout carries responses only; INFO events would interleave with them.
    Logger::set_min_severity(Severity::Warn);

    let result = load_options(cli.config.as_deref()).and_then(|o| run_command(&o, cli.command));
    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), &e.message())?;
            Err(e)
        }
    }
}

/// Options from the config file, or defaults when none is given
pub fn load_options(config: Option<&Path>) -> CliResult<LogOptions> {
    match config {
        Some(path) => Ok(LogOptions::load(path)?),
        None => Ok(LogOptions::default()),
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(options: &LogOptions, cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Append { log, data } => {
            let payload = match data {
                Some(text) => text.into_bytes(),
                None => read_payload()?,
            };
            append(&log, options, &payload)
        }
        Command::Read { log, id } => read(&log, options, id),
        Command::Last { log } => last(&log, options),
        Command::Count { log } => count(&log, options),
        Command::Truncate { log, at } => truncate(&log, options, at),
        Command::Scan { file, from } => scan(&file, options, from),
        Command::CursorGet { file, default } => cursor_get(&file, default),
        Command::CursorSet { file, value } => cursor_set(&file, value),
    }
}

/// Append one record to a monotonic log
pub fn append(base: &Path, options: &LogOptions, payload: &[u8]) -> CliResult<Value> {
    let log = MonotonicLog::open(base, *options)?;
    let id = log.append(payload)?;
    log.sync()?;
    Ok(json!({ "id": id }))
}

/// Read one record of a monotonic log by ID
pub fn read(base: &Path, options: &LogOptions, id: u64) -> CliResult<Value> {
    let log = MonotonicLog::open(base, *options)?;
    let payload = log.read(id)?;
    Ok(record_json(id, &payload))
}

/// Read the last record of a monotonic log
pub fn last(base: &Path, options: &LogOptions) -> CliResult<Value> {
    let log = MonotonicLog::open(base, *options)?;
    let payload = log.last()?;
    let id = log.count()?.saturating_sub(1);
    Ok(record_json(id, &payload))
}

/// Count the records of a monotonic log
pub fn count(base: &Path, options: &LogOptions) -> CliResult<Value> {
    let log = MonotonicLog::open(base, *options)?;
    Ok(json!({ "count": log.count()? }))
}

/// Truncate a monotonic log at an ID
pub fn truncate(base: &Path, options: &LogOptions, at: u64) -> CliResult<Value> {
    let mut log = MonotonicLog::open(base, *options)?;
    log.truncate_at(at)?;
    log.sync()?;
    Ok(json!({ "count": log.count()? }))
}

/// List the valid records of a raw append log
pub fn scan(path: &Path, options: &LogOptions, from: u64) -> CliResult<Value> {
    let reader = AppendReader::open(path, *options)?;

    let mut records = Vec::new();
    reader.scan(from, |payload, unit, next_unit| -> CliResult<()> {
        records.push(json!({
            "unit": unit,
            "next_unit": next_unit,
            "len": payload.len(),
            "payload": String::from_utf8_lossy(payload),
        }));
        Ok(())
    })?;

    Ok(json!({ "records": records }))
}

/// Read a cursor; a missing file yields the default without creating it
pub fn cursor_get(path: &Path, default: i64) -> CliResult<Value> {
    let offset = if path.exists() {
        OffsetCursor::open(path)?.read_or_default(default)
    } else {
        default
    };
    Ok(json!({ "offset": offset }))
}

/// Store a cursor value durably
pub fn cursor_set(path: &Path, value: i64) -> CliResult<Value> {
    let cursor = OffsetCursor::open(path)?;
    cursor.set_offset(value)?;
    cursor.sync()?;
    Ok(json!({ "offset": value }))
}

fn record_json(id: u64, payload: &[u8]) -> Value {
    json!({
        "id": id,
        "len": payload.len(),
        "payload": String::from_utf8_lossy(payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_read_last_count() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("q");
        let options = LogOptions::default();

        assert_eq!(append(&base, &options, b"first").unwrap(), json!({ "id": 0 }));
        assert_eq!(append(&base, &options, b"second").unwrap(), json!({ "id": 1 }));

        let record = read(&base, &options, 0).unwrap();
        assert_eq!(record["payload"], "first");
        assert_eq!(record["len"], 5);

        let record = last(&base, &options).unwrap();
        assert_eq!(record["id"], 1);
        assert_eq!(record["payload"], "second");

        assert_eq!(count(&base, &options).unwrap(), json!({ "count": 2 }));
    }

    #[test]
    fn test_truncate_command() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("q");
        let options = LogOptions::default();
        for word in ["a", "b", "c"] {
            append(&base, &options, word.as_bytes()).unwrap();
        }

        assert_eq!(truncate(&base, &options, 1).unwrap(), json!({ "count": 1 }));
        let err = read(&base, &options, 1).unwrap_err();
        assert_eq!(err.code_str(), "PEN_OUT_OF_RANGE");
    }

    #[test]
    fn test_last_on_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        let err = last(&temp_dir.path().join("q"), &LogOptions::default()).unwrap_err();
        assert_eq!(err.code_str(), "PEN_EMPTY");
    }

    #[test]
    fn test_scan_command_reads_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("q");
        let options = LogOptions::default();
        append(&base, &options, b"one").unwrap();
        append(&base, &options, b"two").unwrap();

        let result = scan(&temp_dir.path().join("q.data"), &options, 0).unwrap();
        let records = result["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["unit"], 1);
        assert_eq!(records[1]["payload"], "two");
    }

    #[test]
    fn test_scan_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = scan(&temp_dir.path().join("none"), &LogOptions::default(), 0).unwrap_err();
        assert_eq!(err.code_str(), "PEN_IO_ERROR");
    }

    #[test]
    fn test_cursor_commands() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cursor");

        assert_eq!(cursor_get(&path, 7).unwrap(), json!({ "offset": 7 }));
        assert!(!path.exists());

        cursor_set(&path, -3).unwrap();
        assert_eq!(cursor_get(&path, 7).unwrap(), json!({ "offset": -3 }));
    }

    #[test]
    fn test_load_options_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("penlog.json");
        fs::write(&path, r#"{"pad": 16}"#).unwrap();

        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.pad, 16);
        assert_eq!(load_options(None).unwrap(), LogOptions::default());
    }

    #[test]
    fn test_run_command_dispatch() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("q");
        let options = LogOptions::default();

        run_command(
            &options,
            Command::Append {
                log: log.clone(),
                data: Some("via dispatch".to_string()),
            },
        )
        .unwrap();

        let result = run_command(&options, Command::Read { log, id: 0 }).unwrap();
        assert_eq!(result["payload"], "via dispatch");
    }
}
