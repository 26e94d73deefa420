//! Replay script parsing.
//!
//! A script is JSON lines, one step per line:
//!
//! ```text
//! {"source":"runner","event":"runnables:ready","payload":{"tests":[{"id":"t1"}]}}
//! {"source":"ui","event":"show:error","payload":"t1"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use runbridge_core::{CoreError, LocalCommand, RunnerEvent};
use runbridge_sync::BridgeError;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while replaying a script.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to set up replay session: {0}")]
    Setup(#[source] BridgeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid JSON: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: CoreError,
    },

    #[error("line {line}: {source}")]
    Step {
        line: usize,
        #[source]
        source: BridgeError,
    },
}

impl ReplayError {
    /// Script line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Setup(_) | Self::Io(_) => None,
            Self::Parse { line, .. } | Self::Decode { line, .. } | Self::Step { line, .. } => {
                Some(*line)
            }
        }
    }
}

/// Which side of the bridge a step comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Runner,
    Ui,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    source: Source,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// A decoded script step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Runner(RunnerEvent),
    Ui(LocalCommand),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Runner(event) => event.name(),
            Self::Ui(command) => command.name(),
        }
    }
}

/// Parse one script line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Step>, ReplayError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let raw: RawStep =
        serde_json::from_str(text).map_err(|source| ReplayError::Parse { line, source })?;

    let step = match raw.source {
        Source::Runner => RunnerEvent::from_parts(&raw.event, raw.payload).map(Step::Runner),
        Source::Ui => LocalCommand::from_parts(&raw.event, raw.payload).map(Step::Ui),
    }
    .map_err(|source| ReplayError::Decode { line, source })?;

    Ok(Some(step))
}
