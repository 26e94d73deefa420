//! Replay configuration.

use std::path::PathBuf;

/// Replay configuration.
pub struct ReplayConfig {
    /// Script to read. `None` reads stdin.
    pub script: Option<PathBuf>,

    /// Abort on the first failing step.
    pub stop_on_error: bool,

    /// Tracing filter directive for stderr diagnostics.
    pub log_filter: String,

    /// Emit a summary line with the final UI state.
    pub summary: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            script: None,
            stop_on_error: false,
            log_filter: "warn".to_string(),
            summary: false,
        }
    }
}
