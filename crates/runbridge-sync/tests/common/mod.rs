//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use runbridge_core::{
    LogEntry, RootRunnable, RunnerSignal, StartInfo, TestId, TestRecord, TestState,
};
use runbridge_sync::{
    AppState, BridgeError, EventRouter, LifecycleCoordinator, LocalCommandBus, RunnablesStore,
    RunnerChannel, StatsStore,
};

/// Ordered log of every collaborator call and runner signal.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn signals(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|e| e.starts_with("signal:"))
            .collect()
    }
}

pub struct SpyApp {
    calls: Calls,
}

impl AppState for SpyApp {
    fn reset(&mut self) -> Result<(), BridgeError> {
        self.calls.push("app.reset");
        Ok(())
    }

    fn start_running(&mut self) -> Result<(), BridgeError> {
        self.calls.push("app.start_running");
        Ok(())
    }

    fn pause(&mut self, next_command_name: Option<&str>) -> Result<(), BridgeError> {
        self.calls
            .push(format!("app.pause({})", next_command_name.unwrap_or("")));
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BridgeError> {
        self.calls.push("app.resume");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.calls.push("app.stop");
        Ok(())
    }
}

pub struct SpyRunnables {
    calls: Calls,
    has_tests: bool,
    tests: HashMap<TestId, TestRecord>,
}

impl RunnablesStore for SpyRunnables {
    fn set_runnables(&mut self, root: RootRunnable) -> Result<(), BridgeError> {
        self.calls
            .push(format!("runnables.set_runnables({})", root.tests().len()));
        Ok(())
    }

    fn add_log(&mut self, log: LogEntry) -> Result<(), BridgeError> {
        self.calls.push(format!("runnables.add_log({})", log.id));
        Ok(())
    }

    fn update_log(&mut self, log: &LogEntry) -> Result<(), BridgeError> {
        self.calls.push(format!("runnables.update_log({})", log.id));
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        self.calls.push("runnables.reset");
        Ok(())
    }

    fn has_tests(&self) -> bool {
        self.has_tests
    }

    fn runnable_started(&mut self, runnable: &TestRecord) -> Result<(), BridgeError> {
        self.calls
            .push(format!("runnables.runnable_started({})", runnable.id));
        Ok(())
    }

    fn runnable_finished(&mut self, runnable: &TestRecord) -> Result<(), BridgeError> {
        self.calls
            .push(format!("runnables.runnable_finished({})", runnable.id));
        Ok(())
    }

    fn test_by_id(&self, id: &TestId) -> Option<&TestRecord> {
        self.tests.get(id)
    }
}

pub struct SpyStats {
    calls: Calls,
    fail_on_increment: bool,
}

impl StatsStore for SpyStats {
    fn start(&mut self, _info: &StartInfo) -> Result<(), BridgeError> {
        self.calls.push("stats.start");
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        self.calls.push("stats.reset");
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BridgeError> {
        self.calls.push("stats.pause");
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BridgeError> {
        self.calls.push("stats.resume");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.calls.push("stats.stop");
        Ok(())
    }

    fn increment_count(&mut self, state: TestState) -> Result<(), BridgeError> {
        if self.fail_on_increment {
            return Err(BridgeError::Collaborator("stats store is read-only".to_string()));
        }
        self.calls
            .push(format!("stats.increment_count({})", state.as_str()));
        Ok(())
    }
}

pub type SpyRouter = EventRouter<SpyApp, SpyRunnables, SpyStats>;

/// A configured, attached router whose collaborators and runner record into `calls`.
pub struct Harness {
    pub runner: RunnerChannel,
    pub bus: LocalCommandBus,
    pub router: SpyRouter,
    pub calls: Calls,
}

pub struct HarnessBuilder {
    has_tests: bool,
    tests: Vec<TestRecord>,
    fail_on_increment: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            has_tests: true,
            tests: Vec::new(),
            fail_on_increment: false,
        }
    }

    pub fn without_tests(mut self) -> Self {
        self.has_tests = false;
        self
    }

    pub fn with_test(mut self, test: TestRecord) -> Self {
        self.tests.push(test);
        self
    }

    pub fn failing_stats(mut self) -> Self {
        self.fail_on_increment = true;
        self
    }

    pub fn build(self) -> Harness {
        let calls = Calls::default();
        let coordinator = LifecycleCoordinator::new(
            SpyApp {
                calls: calls.clone(),
            },
            SpyRunnables {
                calls: calls.clone(),
                has_tests: self.has_tests,
                tests: self
                    .tests
                    .into_iter()
                    .map(|t| (t.id.clone(), t))
                    .collect(),
            },
            SpyStats {
                calls: calls.clone(),
                fail_on_increment: self.fail_on_increment,
            },
        )
        .into_shared();

        let runner = RunnerChannel::new();
        let recorded = calls.clone();
        runner.on_signal(move |signal: &RunnerSignal| {
            let entry = match signal.payload().as_str() {
                Some(arg) => format!("signal:{}({})", signal.name(), arg),
                None => format!("signal:{}", signal.name()),
            };
            recorded.push(entry);
            Ok(())
        });

        let bus = LocalCommandBus::new();
        let mut router = EventRouter::new(bus.clone());
        router.configure(coordinator).unwrap();
        router.attach(&runner).unwrap();

        Harness {
            runner,
            bus,
            router,
            calls,
        }
    }
}

/// Current phase of the harness coordinator.
pub fn phase(router: &SpyRouter) -> runbridge_core::RunPhase {
    router.coordinator().unwrap().lock().unwrap().phase()
}
