//! Payload records exchanged between the runner and the UI state.
//!
//! Field names follow the runner's camelCase JSON so payloads decode without
//! translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommandId, LogId, TestId};

/// Execution state of a test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    /// Queued but not yet picked up.
    #[default]
    Processing,
    /// Currently executing.
    Active,
    /// Finished successfully.
    Passed,
    /// Finished with an error.
    Failed,
    /// Skipped or marked pending.
    Pending,
}

impl TestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

/// Error attached to a failed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestError {
    /// Human-readable message.
    pub message: String,

    /// True when the error was raised by a command rather than the test body.
    #[serde(default)]
    pub is_command_err: bool,
}

impl TestError {
    /// Create a test-body error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_command_err: false,
        }
    }

    /// Create an error raised by a command.
    pub fn command(message: impl Into<String>) -> Self {
        Self {
            is_command_err: true,
            ..Self::new(message)
        }
    }
}

/// A command executed within a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    pub id: CommandId,

    pub name: String,

    /// Error message if this command failed.
    #[serde(default)]
    pub err: Option<String>,
}

impl CommandRecord {
    pub fn new(id: impl Into<CommandId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            err: None,
        }
    }

    /// Builder method to mark the command as failed.
    pub fn with_err(mut self, message: impl Into<String>) -> Self {
        self.err = Some(message.into());
        self
    }
}

/// A test (runnable) as reported by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub id: TestId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub state: TestState,

    #[serde(default)]
    pub err: Option<TestError>,

    #[serde(default)]
    pub commands: Vec<CommandRecord>,
}

impl TestRecord {
    /// Create a test in the `processing` state.
    pub fn new(id: impl Into<TestId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: TestState::Processing,
            err: None,
            commands: Vec::new(),
        }
    }

    /// Builder method to set the state.
    pub fn with_state(mut self, state: TestState) -> Self {
        self.state = state;
        self
    }

    /// Builder method to attach an error.
    pub fn with_err(mut self, err: TestError) -> Self {
        self.err = Some(err);
        self
    }

    /// Builder method to add a command.
    pub fn with_command(mut self, command: CommandRecord) -> Self {
        self.commands.push(command);
        self
    }

    /// Returns true if the test failed because of a command.
    pub fn has_command_err(&self) -> bool {
        self.err.as_ref().is_some_and(|e| e.is_command_err)
    }

    /// Find the command whose failure produced the test error.
    ///
    /// The last matching command wins, since retries log the same error again.
    pub fn command_matching_err(&self) -> Option<&CommandRecord> {
        let err = self.err.as_ref()?;
        self.commands
            .iter()
            .rev()
            .find(|c| c.err.as_deref() == Some(err.message.as_str()))
    }
}

/// A suite of tests and nested suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    pub id: TestId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub tests: Vec<TestRecord>,

    #[serde(default)]
    pub suites: Vec<Suite>,
}

impl Suite {
    pub fn new(id: impl Into<TestId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    pub fn with_test(mut self, test: TestRecord) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    fn collect_tests<'a>(&'a self, out: &mut Vec<&'a TestRecord>) {
        out.extend(self.tests.iter());
        for suite in &self.suites {
            suite.collect_tests(out);
        }
    }
}

/// Root of the run tree handed over on `runnables:ready`.
///
/// The default value is the empty tree the runner implies when it sends no
/// payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootRunnable {
    #[serde(default)]
    pub tests: Vec<TestRecord>,

    #[serde(default)]
    pub suites: Vec<Suite>,
}

impl RootRunnable {
    pub fn with_test(mut self, test: TestRecord) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    /// All tests in the tree, depth-first in declaration order.
    pub fn tests(&self) -> Vec<&TestRecord> {
        let mut out: Vec<&TestRecord> = self.tests.iter().collect();
        for suite in &self.suites {
            suite.collect_tests(&mut out);
        }
        out
    }

    /// Returns true if the tree holds no tests at all.
    pub fn is_empty(&self) -> bool {
        self.tests().is_empty()
    }
}

/// State of a log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogState {
    #[default]
    Pending,
    Passed,
    Failed,
}

/// A command or agent log line shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogId,

    /// Test the log belongs to, if any.
    #[serde(default)]
    pub test_id: Option<TestId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub state: LogState,

    /// Fields the core passes through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    pub fn new(id: impl Into<LogId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            test_id: None,
            name: name.into(),
            message: String::new(),
            state: LogState::Pending,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_state(mut self, state: LogState) -> Self {
        self.state = state;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Apply a `reporter:log:state:changed` payload in place.
    ///
    /// The identifier never changes; extra fields are merged.
    pub fn apply_update(&mut self, update: &LogEntry) {
        if update.test_id.is_some() {
            self.test_id = update.test_id.clone();
        }
        self.name = update.name.clone();
        self.message = update.message.clone();
        self.state = update.state;
        for (k, v) in &update.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }
}

/// Run configuration reported on `reporter:start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInfo {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub num_passed: u64,

    #[serde(default)]
    pub num_failed: u64,

    #[serde(default)]
    pub num_pending: u64,
}
