//! Run lifecycle state machine.
//!
//! The coordinator turns runner events and local commands into collaborator
//! mutations plus an [`Outcome`] describing what to tell the UI and the
//! runner. It never emits anything itself; the router dispatches the outcome
//! after releasing the coordinator lock.

use std::sync::{Arc, Mutex};

use runbridge_core::{LocalCommand, RunPhase, RunnerEvent, RunnerSignal, TestId};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::channel::EventChannel;
use crate::collaborators::{AppState, RunnablesStore, StatsStore};
use crate::error::BridgeError;

/// Coordinator shared between the router's handlers.
pub type SharedCoordinator<A, R, S> = Arc<Mutex<LifecycleCoordinator<A, R, S>>>;

/// Notification that collaborator state changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    /// Wire name of the event or command that caused the change.
    pub event: &'static str,
    /// Phase after the change.
    pub phase: RunPhase,
}

/// What an event or command produced, to be dispatched after the state update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub change: Option<StateChange>,
    pub signals: Vec<RunnerSignal>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn signal(mut self, signal: RunnerSignal) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.change.is_none() && self.signals.is_empty()
    }

    /// Publish the change notification, then each runner signal in order.
    ///
    /// Every publish is attempted even if an earlier one fails; the first
    /// error is returned.
    pub(crate) fn dispatch(
        self,
        changes: &EventChannel<StateChange>,
        signals: &EventChannel<RunnerSignal>,
    ) -> Result<(), BridgeError> {
        if self.is_empty() {
            return Ok(());
        }
        let mut first_err = None;

        if let Some(change) = &self.change {
            if let Err(e) = changes.publish(change) {
                warn!(event = change.event, error = %e, "State change subscriber failed");
                first_err.get_or_insert(e);
            }
        }
        for signal in &self.signals {
            if let Err(e) = signals.publish(signal) {
                warn!(signal = signal.name(), error = %e, "Runner signal handler failed");
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }
}

/// Owns the run phase and the three UI state collaborators.
pub struct LifecycleCoordinator<A, R, S> {
    phase: RunPhase,
    app: A,
    runnables: R,
    stats: S,
    changes: Arc<EventChannel<StateChange>>,
}

impl<A, R, S> LifecycleCoordinator<A, R, S>
where
    A: AppState,
    R: RunnablesStore,
    S: StatsStore,
{
    /// Create a coordinator in the `Idle` phase.
    pub fn new(app: A, runnables: R, stats: S) -> Self {
        Self {
            phase: RunPhase::Idle,
            app,
            runnables,
            stats,
            changes: Arc::new(EventChannel::new()),
        }
    }

    /// Wrap the coordinator for use by an [`EventRouter`](crate::EventRouter).
    pub fn into_shared(self) -> SharedCoordinator<A, R, S> {
        Arc::new(Mutex::new(self))
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn runnables(&self) -> &R {
        &self.runnables
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    /// Channel carrying a [`StateChange`] after every applied mutation.
    pub fn changes(&self) -> Arc<EventChannel<StateChange>> {
        Arc::clone(&self.changes)
    }

    /// Apply a runner event.
    ///
    /// `run:start` is accepted only from Idle. A stopped run must go through
    /// `reporter:restart:test:run` (which returns to Idle) before it can start
    /// again, so phase only moves along the allowed transitions.
    pub fn handle_event(&mut self, event: &RunnerEvent) -> Result<Outcome, BridgeError> {
        let name = event.name();
        debug!(event = name, phase = %self.phase, "Handling runner event");

        match event {
            RunnerEvent::RunnablesReady(root) => {
                self.runnables.set_runnables(root.clone())?;
            }
            RunnerEvent::LogAdded(log) => {
                self.runnables.add_log(log.clone())?;
            }
            RunnerEvent::LogStateChanged(log) => {
                self.runnables.update_log(log)?;
            }
            RunnerEvent::RestartTestRun => {
                self.app.reset()?;
                self.runnables.reset()?;
                self.stats.reset()?;
                self.phase = self.phase.transition(RunPhase::Idle)?;
                info!("UI state reset for rerun");
                return Ok(self.changed(name).signal(RunnerSignal::Restarted));
            }
            RunnerEvent::RunStart => {
                if !self.runnables.has_tests() {
                    debug!("No tests loaded; ignoring run:start");
                    return Ok(Outcome::none());
                }
                if !self.guard(name, RunPhase::Idle) {
                    return Ok(Outcome::none());
                }
                self.app.start_running()?;
                self.phase = self.phase.transition(RunPhase::Running)?;
            }
            RunnerEvent::ReporterStart(info) => {
                self.stats.start(info)?;
            }
            RunnerEvent::TestBeforeRun(runnable) => {
                self.runnables.runnable_started(runnable)?;
            }
            RunnerEvent::TestAfterRun(runnable) => {
                self.runnables.runnable_finished(runnable)?;
                self.stats.increment_count(runnable.state)?;
            }
            RunnerEvent::Paused { next_command_name } => {
                if !self.guard(name, RunPhase::Running) {
                    return Ok(Outcome::none());
                }
                self.app.pause(next_command_name.as_deref())?;
                self.stats.pause()?;
                self.phase = self.phase.transition(RunPhase::Paused)?;
            }
            RunnerEvent::RunEnd => {
                self.app.stop()?;
                self.stats.stop()?;
                self.phase = self.phase.transition(RunPhase::Stopped)?;
            }
        }

        Ok(self.changed(name))
    }

    /// Translate a local command into runner signals.
    pub fn handle_command(&mut self, command: &LocalCommand) -> Result<Outcome, BridgeError> {
        let name = command.name();
        debug!(command = name, phase = %self.phase, "Handling local command");

        let signal = match command {
            LocalCommand::Resume => {
                self.app.resume()?;
                self.stats.resume()?;
                if self.phase == RunPhase::Paused {
                    self.phase = self.phase.transition(RunPhase::Running)?;
                } else {
                    debug!(phase = %self.phase, "Resume outside a pause; phase unchanged");
                }
                return Ok(self.changed(name).signal(RunnerSignal::Resume));
            }
            LocalCommand::Next => RunnerSignal::Next,
            LocalCommand::Stop => RunnerSignal::Abort,
            LocalCommand::Restart => RunnerSignal::Restart,
            LocalCommand::ShowCommand(id) => RunnerSignal::ConsoleLog(id.clone()),
            LocalCommand::ShowSnapshot(id) => RunnerSignal::ShowSnapshot(id.clone()),
            LocalCommand::HideSnapshot(id) => RunnerSignal::HideSnapshot(id.clone()),
            LocalCommand::FocusTests => RunnerSignal::FocusTests,
            LocalCommand::ShowError(test_id) => return self.show_error(test_id),
        };

        Ok(Outcome::none().signal(signal))
    }

    fn show_error(&self, test_id: &TestId) -> Result<Outcome, BridgeError> {
        let Some(test) = self.runnables.test_by_id(test_id) else {
            error!(test_id = %test_id, "show:error for unknown test; UI and runner are out of sync");
            return Err(BridgeError::TestNotFound(test_id.clone()));
        };

        if !test.has_command_err() {
            return Ok(Outcome::none().signal(RunnerSignal::ConsoleError(test_id.clone())));
        }

        match test.command_matching_err() {
            Some(command) => Ok(Outcome::none().signal(RunnerSignal::ConsoleLog(command.id.clone()))),
            None => {
                debug!(test_id = %test_id, "No command matches the error; nothing to show");
                Ok(Outcome::none())
            }
        }
    }

    fn guard(&self, event: &'static str, expected: RunPhase) -> bool {
        if self.phase == expected {
            return true;
        }
        warn!(event, phase = %self.phase, expected = %expected, "Ignoring event outside its phase");
        false
    }

    fn changed(&self, event: &'static str) -> Outcome {
        Outcome {
            change: Some(StateChange {
                event,
                phase: self.phase,
            }),
            signals: Vec::new(),
        }
    }
}
