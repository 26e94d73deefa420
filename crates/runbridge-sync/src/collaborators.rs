//! Capabilities the core requires from the UI state.
//!
//! The core only drives these entry points; how state is stored and rendered
//! belongs to the implementations. [`crate::memory`] ships plain in-memory
//! versions.

use runbridge_core::{LogEntry, RootRunnable, StartInfo, TestId, TestRecord, TestState};

use crate::error::BridgeError;

/// Application-wide run flags (running, paused, stopped).
pub trait AppState: Send {
    /// Return to the initial, empty condition.
    fn reset(&mut self) -> Result<(), BridgeError>;

    fn start_running(&mut self) -> Result<(), BridgeError>;

    /// Pause before `next_command_name`, when the runner names it.
    fn pause(&mut self, next_command_name: Option<&str>) -> Result<(), BridgeError>;

    fn resume(&mut self) -> Result<(), BridgeError>;

    fn stop(&mut self) -> Result<(), BridgeError>;
}

/// The run tree and its logs.
pub trait RunnablesStore: Send {
    fn set_runnables(&mut self, root: RootRunnable) -> Result<(), BridgeError>;

    fn add_log(&mut self, log: LogEntry) -> Result<(), BridgeError>;

    /// Mutate an existing log in place. Unknown ids are the store's call.
    fn update_log(&mut self, log: &LogEntry) -> Result<(), BridgeError>;

    fn reset(&mut self) -> Result<(), BridgeError>;

    fn has_tests(&self) -> bool;

    fn runnable_started(&mut self, runnable: &TestRecord) -> Result<(), BridgeError>;

    fn runnable_finished(&mut self, runnable: &TestRecord) -> Result<(), BridgeError>;

    fn test_by_id(&self, id: &TestId) -> Option<&TestRecord>;
}

/// Run statistics: counters and timing.
pub trait StatsStore: Send {
    fn start(&mut self, info: &StartInfo) -> Result<(), BridgeError>;

    fn reset(&mut self) -> Result<(), BridgeError>;

    fn pause(&mut self) -> Result<(), BridgeError>;

    fn resume(&mut self) -> Result<(), BridgeError>;

    fn stop(&mut self) -> Result<(), BridgeError>;

    fn increment_count(&mut self, state: TestState) -> Result<(), BridgeError>;
}
