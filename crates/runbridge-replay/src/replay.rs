//! Drives a script through a router wired to in-memory collaborators.

use std::io::{BufRead, Write};
use std::sync::{Arc, PoisonError};

use runbridge_core::RunnerSignal;
use runbridge_sync::memory::{MemoryAppState, MemoryRunnables, MemoryStats};
use runbridge_sync::{
    BridgeError, EventRouter, LifecycleCoordinator, LocalCommandBus, RunnerChannel,
    SharedCoordinator, StateChange,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::ReplayConfig;
use crate::output::{OutputKind, OutputLine, Sink};
use crate::script::{parse_line, ReplayError, Step};

type Coordinator = SharedCoordinator<MemoryAppState, MemoryRunnables, MemoryStats>;

/// Counts from a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Steps applied without error.
    pub steps: usize,
    /// Lines that failed to parse, decode or apply.
    pub failures: usize,
}

impl ReplayReport {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

struct ReplaySession {
    runner: RunnerChannel,
    bus: LocalCommandBus,
    coordinator: Coordinator,
    sink: Sink,
    _router: EventRouter<MemoryAppState, MemoryRunnables, MemoryStats>,
}

impl ReplaySession {
    fn new() -> Result<Self, BridgeError> {
        let coordinator = LifecycleCoordinator::new(
            MemoryAppState::default(),
            MemoryRunnables::default(),
            MemoryStats::default(),
        )
        .into_shared();
        let sink = Sink::default();

        let changes = coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .changes();
        let change_sink = sink.clone();
        changes.subscribe(move |change: &StateChange| {
            change_sink.push(OutputLine::new(
                OutputKind::Change,
                json!({ "event": change.event, "phase": change.phase }),
            ));
            Ok(())
        });

        let runner = RunnerChannel::new();
        let signal_sink = sink.clone();
        runner.on_signal(move |signal: &RunnerSignal| {
            signal_sink.push(OutputLine::new(
                OutputKind::Signal,
                json!({ "event": signal.name(), "payload": signal.payload() }),
            ));
            Ok(())
        });

        let bus = LocalCommandBus::new();
        let mut router = EventRouter::new(bus.clone());
        router.configure(Arc::clone(&coordinator))?;
        router.attach(&runner)?;

        Ok(Self {
            runner,
            bus,
            coordinator,
            sink,
            _router: router,
        })
    }

    fn apply(&self, line: usize, step: Step) -> Result<(), ReplayError> {
        debug!(line, event = step.name(), "Applying step");
        match step {
            Step::Runner(event) => self.runner.raise(event),
            Step::Ui(command) => self.bus.publish(command),
        }
        .map_err(|source| ReplayError::Step { line, source })
    }

    fn summary(&self) -> serde_json::Value {
        let coordinator = self
            .coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let runnables = coordinator.runnables();
        json!({
            "phase": coordinator.phase(),
            "app": coordinator.app(),
            "stats": coordinator.stats().snapshot(),
            "tests": runnables.test_count(),
            "active": runnables.active(),
            "finished": runnables.finished(),
            "logs": runnables.log_count(),
        })
    }
}

/// Replay every line of `input`, writing JSON lines to `out`.
///
/// Failing lines are reported as `error` lines and counted unless
/// `stop_on_error` is set, in which case the first failure is returned.
pub fn replay<R, W>(config: &ReplayConfig, input: R, out: &mut W) -> Result<ReplayReport, ReplayError>
where
    R: BufRead,
    W: Write,
{
    let session = ReplaySession::new().map_err(ReplayError::Setup)?;
    let mut report = ReplayReport::default();

    for (index, text) in input.lines().enumerate() {
        let line = index + 1;
        let text = text?;

        let result = parse_line(line, &text).and_then(|step| match step {
            Some(step) => session.apply(line, step).map(|_| true),
            None => Ok(false),
        });

        match result {
            Ok(true) => report.steps += 1,
            Ok(false) => {}
            Err(err) => {
                report.failures += 1;
                warn!(line, error = %err, "Replay step failed");
                session.sink.push(OutputLine::new(
                    OutputKind::Error,
                    json!({ "line": line, "message": err.to_string() }),
                ));
                if config.stop_on_error {
                    session.sink.flush_to(out)?;
                    return Err(err);
                }
            }
        }

        session.sink.flush_to(out)?;
    }

    if config.summary {
        OutputLine::new(OutputKind::Summary, session.summary()).write_to(out)?;
    }

    info!(steps = report.steps, failures = report.failures, "Replay finished");
    Ok(report)
}
