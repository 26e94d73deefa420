//! Core domain errors.

use thiserror::Error;

use crate::phase::RunPhase;

/// Core domain errors for runbridge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid run phase transition.
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: RunPhase, to: RunPhase },

    /// Event name is not part of the protocol.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Payload could not be decoded for the named event.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
