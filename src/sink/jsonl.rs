//! Append-only JSONL event log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use super::EventSink;
use crate::domain::ChainEvent;
use crate::error::Result;

#[derive(Serialize)]
struct Envelope<'a> {
    /// Unix timestamp in milliseconds
    ts: i64,
    event: &'a ChainEvent,
}

/// Sink that appends one timestamped JSON line per event.
///
/// Write failures drop the event; a sink must never affect the run.
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlSink {
    /// Open (or create) the log at the given path, appending to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlSink {
    fn emit(&self, event: &ChainEvent) {
        let envelope = Envelope {
            ts: Utc::now().timestamp_millis(),
            event,
        };
        let Ok(line) = serde_json::to_string(&envelope) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("events.jsonl");
        let sink = JsonlSink::open(&path).unwrap();
        assert_eq!(sink.path(), path);
        assert!(path.exists());
    }

    #[test]
    fn test_emit_writes_one_line_per_event() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("events.jsonl");
        let sink = JsonlSink::open(&path).unwrap();

        sink.emit(&ChainEvent::ChainStarted { stages: 2 });
        sink.emit(&ChainEvent::ChainCompleted {
            success: true,
            elapsed_ms: 42,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert!(first["ts"].as_i64().unwrap() > 0);
        assert_eq!(first["event"]["type"], "chain_started");
        assert_eq!(first["event"]["stages"], 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"]["type"], "chain_completed");
        assert_eq!(second["event"]["success"], true);
    }

    #[test]
    fn test_emit_appends_across_opens() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("events.jsonl");

        {
            let sink = JsonlSink::open(&path).unwrap();
            sink.emit(&ChainEvent::ChainStarted { stages: 1 });
        }
        {
            let sink = JsonlSink::open(&path).unwrap();
            sink.emit(&ChainEvent::ChainCompleted {
                success: false,
                elapsed_ms: 7,
            });
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
