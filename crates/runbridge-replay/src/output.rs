//! JSON-lines output for replay results.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// Kinds of lines the replay writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// A signal the core emitted toward the runner.
    Signal,
    /// A UI state change notification.
    Change,
    /// A step that failed.
    Error,
    /// Final state, written when requested.
    Summary,
}

/// One line of replay output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl OutputLine {
    /// Create a line stamped with the current time.
    pub fn new(kind: OutputKind, data: serde_json::Value) -> Self {
        Self {
            kind,
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let json = serde_json::to_string(self)?;
        writeln!(out, "{}", json)
    }
}

/// Buffer filled from event handlers and drained between steps.
#[derive(Debug, Clone, Default)]
pub struct Sink {
    lines: Arc<Mutex<Vec<OutputLine>>>,
}

impl Sink {
    pub fn push(&self, line: OutputLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// Write and clear everything buffered so far.
    pub fn flush_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let lines = std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner));
        for line in &lines {
            line.write_to(out)?;
        }
        out.flush()
    }
}
