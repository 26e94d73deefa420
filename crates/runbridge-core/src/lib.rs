//! runbridge Core Domain Types
//!
//! This crate contains the vocabulary shared by the runner and the UI state:
//! - Run phases and their allowed transitions
//! - Payload records (runnables, logs, start info)
//! - Inbound, outbound, and local event enums with their wire names
//!
//! Nothing here dispatches events. Routing lives in `runbridge-sync`.

pub mod error;
pub mod event;
pub mod ids;
pub mod model;
pub mod phase;

// Re-export commonly used types
pub use error::CoreError;
pub use event::{LocalCommand, RunnerEvent, RunnerSignal};
pub use ids::{CommandId, LogId, TestId};
pub use model::{
    CommandRecord, LogEntry, LogState, RootRunnable, StartInfo, Suite, TestError, TestRecord,
    TestState,
};
pub use phase::RunPhase;
