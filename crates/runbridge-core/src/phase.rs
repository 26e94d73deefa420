//! Run lifecycle phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Phase of the current run as seen by the UI.
///
/// Allowed transitions:
///
/// ```text
/// Idle ──run:start──► Running ──paused──► Paused
///                        ▲                  │
///                        └──────resume──────┘
/// any ──run:end──► Stopped        any ──restart──► Idle
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No run in progress; the initial phase and the phase after a restart.
    #[default]
    Idle,
    /// Tests are executing.
    Running,
    /// The runner is halted before the next command.
    Paused,
    /// The run ended. Only a restart leaves this phase.
    Stopped,
}

impl RunPhase {
    /// Returns true if moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(self, to: RunPhase) -> bool {
        match (self, to) {
            (_, Self::Stopped) | (_, Self::Idle) => true,
            (Self::Idle, Self::Running) => true,
            (Self::Running, Self::Paused) => true,
            (Self::Paused, Self::Running) => true,
            _ => false,
        }
    }

    /// Validate a transition and return the new phase.
    pub fn transition(self, to: RunPhase) -> Result<RunPhase, CoreError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CoreError::InvalidPhaseTransition { from: self, to })
        }
    }

    /// Lowercase name used in logs and replay output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
