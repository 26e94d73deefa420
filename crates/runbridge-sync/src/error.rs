//! Error types for the synchronization core.

use runbridge_core::{CoreError, TestId};
use thiserror::Error;

/// Errors raised while routing events across the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `attach` was called before `configure`.
    #[error("Router is not configured; call configure() before attach()")]
    NotConfigured,

    /// `configure` was called twice, or after a runner was attached.
    #[error("Router is already configured")]
    AlreadyConfigured,

    /// A runner is attached and has not been detached.
    #[error("A runner is already attached; detach it before attaching another")]
    AlreadyAttached,

    /// The UI referenced a test the runnables store does not know.
    #[error("Test not found: {0}")]
    TestNotFound(TestId),

    /// Domain error from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A collaborator failed while applying a mutation.
    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

impl BridgeError {
    /// Returns true for programmer errors in router setup.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured | Self::AlreadyConfigured | Self::AlreadyAttached
        )
    }

    /// Returns true when the UI and runner disagree about which tests exist.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::TestNotFound(_))
    }
}
