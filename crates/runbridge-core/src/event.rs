//! Events exchanged across the bridge, with their wire names.
//!
//! Three vocabularies exist:
//! - [`RunnerEvent`]: raised by the runner, consumed by the core.
//! - [`RunnerSignal`]: emitted by the core toward the runner.
//! - [`LocalCommand`]: published by the UI on the local command bus.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::ids::{CommandId, TestId};
use crate::model::{LogEntry, RootRunnable, StartInfo, TestRecord};

/// Wire names for every event in the protocol.
pub mod names {
    // Runner -> core
    pub const RUNNABLES_READY: &str = "runnables:ready";
    pub const LOG_ADD: &str = "reporter:log:add";
    pub const LOG_STATE_CHANGED: &str = "reporter:log:state:changed";
    pub const RESTART_TEST_RUN: &str = "reporter:restart:test:run";
    pub const RUN_START: &str = "run:start";
    pub const REPORTER_START: &str = "reporter:start";
    pub const TEST_BEFORE_RUN: &str = "test:before:run";
    pub const TEST_AFTER_RUN: &str = "test:after:run";
    pub const PAUSED: &str = "paused";
    pub const RUN_END: &str = "run:end";

    // Core -> runner
    pub const RESTARTED: &str = "reporter:restarted";
    pub const RUNNER_RESUME: &str = "runner:resume";
    pub const RUNNER_NEXT: &str = "runner:next";
    pub const RUNNER_ABORT: &str = "runner:abort";
    pub const RUNNER_RESTART: &str = "runner:restart";
    pub const CONSOLE_LOG: &str = "runner:console:log";
    pub const CONSOLE_ERROR: &str = "runner:console:error";
    pub const RUNNER_SHOW_SNAPSHOT: &str = "runner:show:snapshot";
    pub const RUNNER_HIDE_SNAPSHOT: &str = "runner:hide:snapshot";
    pub const FOCUS_TESTS: &str = "focus:tests";

    // UI -> core
    pub const RESUME: &str = "resume";
    pub const NEXT: &str = "next";
    pub const STOP: &str = "stop";
    pub const RESTART: &str = "restart";
    pub const SHOW_COMMAND: &str = "show:command";
    pub const SHOW_ERROR: &str = "show:error";
    pub const SHOW_SNAPSHOT: &str = "show:snapshot";
    pub const HIDE_SNAPSHOT: &str = "hide:snapshot";
}

/// Lifecycle and result events raised by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// The run tree is known.
    RunnablesReady(RootRunnable),
    /// A log entry was created.
    LogAdded(LogEntry),
    /// An existing log entry changed.
    LogStateChanged(LogEntry),
    /// The runner asks the UI to reset before a rerun.
    RestartTestRun,
    /// Test execution begins.
    RunStart,
    /// Run configuration for statistics.
    ReporterStart(StartInfo),
    /// A test is about to run.
    TestBeforeRun(TestRecord),
    /// A test finished; its `state` holds the outcome.
    TestAfterRun(TestRecord),
    /// The runner halted before the named command.
    Paused { next_command_name: Option<String> },
    /// Test execution is over.
    RunEnd,
}

impl RunnerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunnablesReady(_) => names::RUNNABLES_READY,
            Self::LogAdded(_) => names::LOG_ADD,
            Self::LogStateChanged(_) => names::LOG_STATE_CHANGED,
            Self::RestartTestRun => names::RESTART_TEST_RUN,
            Self::RunStart => names::RUN_START,
            Self::ReporterStart(_) => names::REPORTER_START,
            Self::TestBeforeRun(_) => names::TEST_BEFORE_RUN,
            Self::TestAfterRun(_) => names::TEST_AFTER_RUN,
            Self::Paused { .. } => names::PAUSED,
            Self::RunEnd => names::RUN_END,
        }
    }

    /// Decode an event from its wire name and JSON payload.
    ///
    /// `runnables:ready` without a payload yields the empty tree.
    /// `test:after:run` requires the runnable to carry a `state`.
    pub fn from_parts(name: &str, payload: Value) -> Result<Self, CoreError> {
        let event = match name {
            names::RUNNABLES_READY => {
                if payload.is_null() {
                    Self::RunnablesReady(RootRunnable::default())
                } else {
                    Self::RunnablesReady(decode(name, payload)?)
                }
            }
            names::LOG_ADD => Self::LogAdded(decode(name, payload)?),
            names::LOG_STATE_CHANGED => Self::LogStateChanged(decode(name, payload)?),
            names::RESTART_TEST_RUN => Self::RestartTestRun,
            names::RUN_START => Self::RunStart,
            names::REPORTER_START => Self::ReporterStart(decode(name, payload)?),
            names::TEST_BEFORE_RUN => Self::TestBeforeRun(decode(name, payload)?),
            names::TEST_AFTER_RUN => {
                if payload.get("state").map_or(true, Value::is_null) {
                    return Err(CoreError::Serialization(format!(
                        "{name}: runnable is missing `state`"
                    )));
                }
                Self::TestAfterRun(decode(name, payload)?)
            }
            names::PAUSED => Self::Paused {
                next_command_name: decode(name, payload)?,
            },
            names::RUN_END => Self::RunEnd,
            other => return Err(CoreError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}

/// Control signals the core emits toward the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerSignal {
    /// Acknowledges `reporter:restart:test:run` once the UI state is reset.
    Restarted,
    Resume,
    Next,
    Abort,
    Restart,
    /// Print a command to the browser console.
    ConsoleLog(CommandId),
    /// Print a test error to the browser console.
    ConsoleError(TestId),
    ShowSnapshot(CommandId),
    HideSnapshot(CommandId),
    FocusTests,
}

impl RunnerSignal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Restarted => names::RESTARTED,
            Self::Resume => names::RUNNER_RESUME,
            Self::Next => names::RUNNER_NEXT,
            Self::Abort => names::RUNNER_ABORT,
            Self::Restart => names::RUNNER_RESTART,
            Self::ConsoleLog(_) => names::CONSOLE_LOG,
            Self::ConsoleError(_) => names::CONSOLE_ERROR,
            Self::ShowSnapshot(_) => names::RUNNER_SHOW_SNAPSHOT,
            Self::HideSnapshot(_) => names::RUNNER_HIDE_SNAPSHOT,
            Self::FocusTests => names::FOCUS_TESTS,
        }
    }

    /// The signal's single argument as JSON, or `null` when it has none.
    pub fn payload(&self) -> Value {
        match self {
            Self::ConsoleLog(id) | Self::ShowSnapshot(id) | Self::HideSnapshot(id) => {
                Value::String(id.to_string())
            }
            Self::ConsoleError(id) => Value::String(id.to_string()),
            _ => Value::Null,
        }
    }
}

/// Intents published by the UI on the local command bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Resume,
    Next,
    Stop,
    Restart,
    ShowCommand(CommandId),
    ShowError(TestId),
    ShowSnapshot(CommandId),
    HideSnapshot(CommandId),
    FocusTests,
}

impl LocalCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resume => names::RESUME,
            Self::Next => names::NEXT,
            Self::Stop => names::STOP,
            Self::Restart => names::RESTART,
            Self::ShowCommand(_) => names::SHOW_COMMAND,
            Self::ShowError(_) => names::SHOW_ERROR,
            Self::ShowSnapshot(_) => names::SHOW_SNAPSHOT,
            Self::HideSnapshot(_) => names::HIDE_SNAPSHOT,
            Self::FocusTests => names::FOCUS_TESTS,
        }
    }

    /// Decode a command from its wire name and JSON payload.
    pub fn from_parts(name: &str, payload: Value) -> Result<Self, CoreError> {
        let command = match name {
            names::RESUME => Self::Resume,
            names::NEXT => Self::Next,
            names::STOP => Self::Stop,
            names::RESTART => Self::Restart,
            names::SHOW_COMMAND => Self::ShowCommand(decode(name, payload)?),
            names::SHOW_ERROR => Self::ShowError(decode(name, payload)?),
            names::SHOW_SNAPSHOT => Self::ShowSnapshot(decode(name, payload)?),
            names::HIDE_SNAPSHOT => Self::HideSnapshot(decode(name, payload)?),
            names::FOCUS_TESTS => Self::FocusTests,
            other => return Err(CoreError::UnknownEvent(other.to_string())),
        };
        Ok(command)
    }
}

fn decode<T: DeserializeOwned>(name: &str, payload: Value) -> Result<T, CoreError> {
    serde_json::from_value(payload).map_err(|e| CoreError::Serialization(format!("{name}: {e}")))
}
