//! In-memory collaborator implementations.
//!
//! These hold the UI state as plain data. They back the replay harness and
//! the tests, and serve as the reference for what each entry point means.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use runbridge_core::{
    LogEntry, LogId, RootRunnable, StartInfo, TestId, TestRecord, TestState,
};
use serde::Serialize;
use tracing::debug;

use crate::collaborators::{AppState, RunnablesStore, StatsStore};
use crate::error::BridgeError;

/// Run flags as a UI would display them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryAppState {
    pub is_running: bool,
    pub is_paused: bool,
    pub is_stopped: bool,
    /// Command the runner will execute once resumed.
    pub next_command_name: Option<String>,
}

impl AppState for MemoryAppState {
    fn reset(&mut self) -> Result<(), BridgeError> {
        *self = Self::default();
        Ok(())
    }

    fn start_running(&mut self) -> Result<(), BridgeError> {
        self.is_running = true;
        self.is_stopped = false;
        Ok(())
    }

    fn pause(&mut self, next_command_name: Option<&str>) -> Result<(), BridgeError> {
        self.is_paused = true;
        self.next_command_name = next_command_name.map(str::to_owned);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BridgeError> {
        self.is_paused = false;
        self.next_command_name = None;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.is_running = false;
        self.is_paused = false;
        self.is_stopped = true;
        Ok(())
    }
}

/// Run tree indexed by test id, plus logs in arrival order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRunnables {
    root: Option<RootRunnable>,
    tests: HashMap<TestId, TestRecord>,
    logs: HashMap<LogId, LogEntry>,
    log_order: Vec<LogId>,
    active: Option<TestId>,
    finished: Vec<TestId>,
}

impl MemoryRunnables {
    pub fn root(&self) -> Option<&RootRunnable> {
        self.root.as_ref()
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Test currently executing, if any.
    pub fn active(&self) -> Option<&TestId> {
        self.active.as_ref()
    }

    /// Ids of finished tests, in finishing order.
    pub fn finished(&self) -> &[TestId] {
        &self.finished
    }

    pub fn log(&self, id: &LogId) -> Option<&LogEntry> {
        self.logs.get(id)
    }

    /// Logs in the order they were added.
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.log_order.iter().filter_map(|id| self.logs.get(id))
    }

    pub fn log_count(&self) -> usize {
        self.log_order.len()
    }
}

impl RunnablesStore for MemoryRunnables {
    fn set_runnables(&mut self, root: RootRunnable) -> Result<(), BridgeError> {
        self.tests = root
            .tests()
            .into_iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();
        debug!(tests = self.tests.len(), "Runnables loaded");
        self.root = Some(root);
        Ok(())
    }

    fn add_log(&mut self, log: LogEntry) -> Result<(), BridgeError> {
        if self.logs.insert(log.id.clone(), log.clone()).is_none() {
            self.log_order.push(log.id);
        }
        Ok(())
    }

    fn update_log(&mut self, log: &LogEntry) -> Result<(), BridgeError> {
        match self.logs.get_mut(&log.id) {
            Some(existing) => existing.apply_update(log),
            None => debug!(log_id = %log.id, "Update for unknown log ignored"),
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        *self = Self::default();
        Ok(())
    }

    fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }

    fn runnable_started(&mut self, runnable: &TestRecord) -> Result<(), BridgeError> {
        let test = self
            .tests
            .entry(runnable.id.clone())
            .or_insert_with(|| runnable.clone());
        test.state = TestState::Active;
        self.active = Some(runnable.id.clone());
        Ok(())
    }

    fn runnable_finished(&mut self, runnable: &TestRecord) -> Result<(), BridgeError> {
        self.tests.insert(runnable.id.clone(), runnable.clone());
        if self.active.as_ref() == Some(&runnable.id) {
            self.active = None;
        }
        self.finished.push(runnable.id.clone());
        Ok(())
    }

    fn test_by_id(&self, id: &TestId) -> Option<&TestRecord> {
        self.tests.get(id)
    }
}

/// Counters and wall-clock timing for the current run.
#[derive(Debug, Clone)]
pub struct MemoryStats {
    num_passed: u64,
    num_failed: u64,
    num_pending: u64,
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    paused_total: Duration,
    stopped_at: Option<DateTime<Utc>>,
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self {
            num_passed: 0,
            num_failed: 0,
            num_pending: 0,
            started_at: None,
            paused_at: None,
            paused_total: Duration::zero(),
            stopped_at: None,
        }
    }
}

/// Serializable view of [`MemoryStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub num_passed: u64,
    pub num_failed: u64,
    pub num_pending: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub duration_ms: Option<i64>,
}

impl MemoryStats {
    /// Counter for a finished state. Non-final states always read zero.
    pub fn count(&self, state: TestState) -> u64 {
        match state {
            TestState::Passed => self.num_passed,
            TestState::Failed => self.num_failed,
            TestState::Pending => self.num_pending,
            TestState::Processing | TestState::Active => 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Run time excluding pauses, measured up to `now` or the stop time.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let started = self.started_at?;
        let end = self.stopped_at.or(self.paused_at).unwrap_or(now);
        Some(end - started - self.paused_total)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            num_passed: self.num_passed,
            num_failed: self.num_failed,
            num_pending: self.num_pending,
            is_running: self.is_running(),
            is_paused: self.is_paused(),
            duration_ms: self
                .duration_at(Utc::now())
                .map(|d| d.num_milliseconds()),
        }
    }
}

impl StatsStore for MemoryStats {
    fn start(&mut self, info: &StartInfo) -> Result<(), BridgeError> {
        self.started_at = Some(info.start_time.unwrap_or_else(Utc::now));
        self.num_passed = info.num_passed;
        self.num_failed = info.num_failed;
        self.num_pending = info.num_pending;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        *self = Self::default();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BridgeError> {
        if self.paused_at.is_none() {
            self.paused_at = Some(Utc::now());
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BridgeError> {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total = self.paused_total + (Utc::now() - paused_at);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.resume()?;
        self.stopped_at = Some(Utc::now());
        Ok(())
    }

    fn increment_count(&mut self, state: TestState) -> Result<(), BridgeError> {
        match state {
            TestState::Passed => self.num_passed += 1,
            TestState::Failed => self.num_failed += 1,
            TestState::Pending => self.num_pending += 1,
            TestState::Processing | TestState::Active => {
                debug!(state = state.as_str(), "Not a final state; not counted");
            }
        }
        Ok(())
    }
}
