//! End-to-end lifecycle with the in-memory collaborators.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use runbridge_core::{
    LocalCommand, LogEntry, LogId, LogState, RootRunnable, RunPhase, RunnerEvent, RunnerSignal,
    StartInfo, Suite, TestRecord, TestState,
};
use runbridge_sync::memory::{MemoryAppState, MemoryRunnables, MemoryStats};
use runbridge_sync::{
    EventRouter, LifecycleCoordinator, LocalCommandBus, RunnablesStore, RunnerChannel,
    SharedCoordinator, StateChange,
};

type Coordinator = SharedCoordinator<MemoryAppState, MemoryRunnables, MemoryStats>;

struct Session {
    runner: RunnerChannel,
    bus: LocalCommandBus,
    coordinator: Coordinator,
    signals: Arc<Mutex<Vec<RunnerSignal>>>,
    changes: Arc<Mutex<Vec<StateChange>>>,
    _router: EventRouter<MemoryAppState, MemoryRunnables, MemoryStats>,
}

impl Session {
    fn new() -> Self {
        let coordinator = LifecycleCoordinator::new(
            MemoryAppState::default(),
            MemoryRunnables::default(),
            MemoryStats::default(),
        )
        .into_shared();

        let changes = Arc::new(Mutex::new(Vec::new()));
        let c = Arc::clone(&changes);
        coordinator
            .lock()
            .unwrap()
            .changes()
            .subscribe(move |change: &StateChange| {
                c.lock().unwrap().push(change.clone());
                Ok(())
            });

        let runner = RunnerChannel::new();
        let signals = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&signals);
        runner.on_signal(move |signal| {
            s.lock().unwrap().push(signal.clone());
            Ok(())
        });

        let bus = LocalCommandBus::new();
        let mut router = EventRouter::new(bus.clone());
        router.configure(Arc::clone(&coordinator)).unwrap();
        router.attach(&runner).unwrap();

        Self {
            runner,
            bus,
            coordinator,
            signals,
            changes,
            _router: router,
        }
    }

    fn phase(&self) -> RunPhase {
        self.coordinator.lock().unwrap().phase()
    }

    fn load(&self) {
        let root = RootRunnable::default().with_suite(
            Suite::new("s1", "login")
                .with_test(TestRecord::new("t1", "shows form"))
                .with_test(TestRecord::new("t2", "rejects bad password"))
                .with_test(TestRecord::new("t3", "remembers user")),
        );
        self.runner.raise(RunnerEvent::RunnablesReady(root)).unwrap();
    }
}

fn allowed(from: RunPhase, to: RunPhase) -> bool {
    from == to
        || matches!(
            (from, to),
            (RunPhase::Idle, RunPhase::Running)
                | (RunPhase::Running, RunPhase::Paused)
                | (RunPhase::Paused, RunPhase::Running)
                | (_, RunPhase::Stopped)
                | (_, RunPhase::Idle)
        )
}

#[derive(Debug, Clone)]
enum Step {
    Event(RunnerEvent),
    Command(LocalCommand),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Event(RunnerEvent::RunStart)),
        proptest::option::of("cy\\.[a-z]{1,8}").prop_map(|next_command_name| {
            Step::Event(RunnerEvent::Paused { next_command_name })
        }),
        Just(Step::Event(RunnerEvent::RunEnd)),
        Just(Step::Event(RunnerEvent::RestartTestRun)),
        prop_oneof![
            Just(TestState::Passed),
            Just(TestState::Failed),
            Just(TestState::Pending),
        ]
        .prop_map(|state| Step::Event(RunnerEvent::TestAfterRun(
            TestRecord::new("t1", "shows form").with_state(state),
        ))),
        Just(Step::Command(LocalCommand::Resume)),
        Just(Step::Command(LocalCommand::Next)),
        Just(Step::Command(LocalCommand::Stop)),
        Just(Step::Event(RunnerEvent::RunnablesReady(
            RootRunnable::default().with_test(TestRecord::new("t1", "shows form")),
        ))),
    ]
}

proptest! {
    #[test]
    fn test_phase_transitions_stay_within_the_state_machine(steps in prop::collection::vec(arb_step(), 1..60)) {
        let session = Session::new();
        session.load();

        let mut previous = session.phase();
        for step in steps {
            match step {
                Step::Event(event) => session.runner.raise(event).unwrap(),
                Step::Command(command) => session.bus.publish(command).unwrap(),
            }
            let current = session.phase();
            prop_assert!(
                allowed(previous, current),
                "illegal transition {} -> {}",
                previous,
                current
            );
            previous = current;
        }
    }
}

#[test]
fn test_full_run_then_restart() {
    let session = Session::new();
    session.load();

    session
        .runner
        .raise(RunnerEvent::ReporterStart(StartInfo::default()))
        .unwrap();
    session.runner.raise(RunnerEvent::RunStart).unwrap();
    session
        .runner
        .raise(RunnerEvent::LogAdded(LogEntry::new("l1", "visit")))
        .unwrap();

    for (id, state) in [
        ("t1", TestState::Passed),
        ("t2", TestState::Passed),
        ("t3", TestState::Failed),
    ] {
        let test = TestRecord::new(id, id);
        session
            .runner
            .raise(RunnerEvent::TestBeforeRun(test.clone()))
            .unwrap();
        session
            .runner
            .raise(RunnerEvent::TestAfterRun(test.with_state(state)))
            .unwrap();
    }
    session
        .runner
        .raise(RunnerEvent::LogStateChanged(
            LogEntry::new("l1", "visit").with_state(LogState::Passed),
        ))
        .unwrap();
    session.runner.raise(RunnerEvent::RunEnd).unwrap();

    {
        let c = session.coordinator.lock().unwrap();
        assert_eq!(c.phase(), RunPhase::Stopped);
        assert_eq!(c.stats().count(TestState::Passed), 2);
        assert_eq!(c.stats().count(TestState::Failed), 1);
        assert_eq!(c.runnables().finished().len(), 3);
        assert_eq!(
            c.runnables().log(&LogId::new("l1")).map(|l| l.state),
            Some(LogState::Passed)
        );
        assert!(c.app().is_stopped);
    }

    session.runner.raise(RunnerEvent::RestartTestRun).unwrap();

    let c = session.coordinator.lock().unwrap();
    assert_eq!(c.phase(), RunPhase::Idle);
    assert_eq!(*c.app(), MemoryAppState::default());
    assert!(!c.runnables().has_tests());
    assert_eq!(c.runnables().log_count(), 0);
    assert_eq!(c.stats().count(TestState::Passed), 0);
    assert_eq!(c.stats().count(TestState::Failed), 0);
    assert!(!c.stats().is_running());

    let restarted = session
        .signals
        .lock()
        .unwrap()
        .iter()
        .filter(|s| **s == RunnerSignal::Restarted)
        .count();
    assert_eq!(restarted, 1);
}

#[test]
fn test_change_notifications_follow_state() {
    let session = Session::new();
    session.load();
    session.runner.raise(RunnerEvent::RunStart).unwrap();
    session
        .runner
        .raise(RunnerEvent::Paused {
            next_command_name: Some("cy.click".to_string()),
        })
        .unwrap();
    session.bus.publish(LocalCommand::Next).unwrap();
    session.bus.publish(LocalCommand::Resume).unwrap();

    let changes = session.changes.lock().unwrap();
    let seen: Vec<(&str, RunPhase)> = changes.iter().map(|c| (c.event, c.phase)).collect();
    assert_eq!(
        seen,
        vec![
            ("runnables:ready", RunPhase::Idle),
            ("run:start", RunPhase::Running),
            ("paused", RunPhase::Paused),
            ("resume", RunPhase::Running),
        ]
    );
}

#[test]
fn test_runner_may_react_synchronously() {
    let session = Session::new();
    session.load();
    session.runner.raise(RunnerEvent::RunStart).unwrap();

    // A runner that answers runner:restart by immediately asking for a reset.
    let runner = session.runner.clone();
    session.runner.on_signal(move |signal| {
        if *signal == RunnerSignal::Restart {
            runner.raise(RunnerEvent::RestartTestRun)?;
        }
        Ok(())
    });

    session.bus.publish(LocalCommand::Restart).unwrap();

    assert_eq!(session.phase(), RunPhase::Idle);
    assert_eq!(
        *session.signals.lock().unwrap(),
        vec![RunnerSignal::Restart, RunnerSignal::Restarted]
    );
}

#[test]
fn test_pause_and_resume_toggle_stats() {
    let session = Session::new();
    session.load();
    session
        .runner
        .raise(RunnerEvent::ReporterStart(StartInfo::default()))
        .unwrap();
    session.runner.raise(RunnerEvent::RunStart).unwrap();
    session
        .runner
        .raise(RunnerEvent::Paused {
            next_command_name: Some("cy.click".to_string()),
        })
        .unwrap();

    {
        let c = session.coordinator.lock().unwrap();
        assert!(c.app().is_paused);
        assert!(c.stats().is_paused());
    }

    session.bus.publish(LocalCommand::Resume).unwrap();

    let c = session.coordinator.lock().unwrap();
    assert_eq!(c.phase(), RunPhase::Running);
    assert!(!c.app().is_paused);
    assert!(!c.stats().is_paused());
    assert_eq!(
        *session.signals.lock().unwrap(),
        vec![RunnerSignal::Resume]
    );
}
