//! Registration of runner and local-bus handlers.

use std::sync::Arc;

use runbridge_core::{LocalCommand, RunnerEvent};
use tracing::{debug, info};

use crate::bus::LocalCommandBus;
use crate::channel::{lock, ListenerId};
use crate::collaborators::{AppState, RunnablesStore, StatsStore};
use crate::coordinator::SharedCoordinator;
use crate::error::BridgeError;
use crate::runner::RunnerChannel;

/// Listeners registered for the currently attached runner.
struct Attachment {
    runner: RunnerChannel,
    runner_listener: ListenerId,
    bus_listener: ListenerId,
}

/// Wires one runner and one local command bus to a lifecycle coordinator.
///
/// Lifecycle: [`new`](Self::new) → [`configure`](Self::configure) once →
/// [`attach`](Self::attach) → [`detach`](Self::detach) → `attach` again, and so
/// on. At most one runner is attached at a time; a second `attach` without a
/// `detach` fails with [`BridgeError::AlreadyAttached`]. Dropping the router
/// detaches it.
pub struct EventRouter<A, R, S> {
    bus: LocalCommandBus,
    coordinator: Option<SharedCoordinator<A, R, S>>,
    attachment: Option<Attachment>,
}

impl<A, R, S> EventRouter<A, R, S> {
    /// Create an unconfigured router for the given bus.
    pub fn new(bus: LocalCommandBus) -> Self {
        Self {
            bus,
            coordinator: None,
            attachment: None,
        }
    }

    pub fn bus(&self) -> &LocalCommandBus {
        &self.bus
    }

    pub fn coordinator(&self) -> Option<&SharedCoordinator<A, R, S>> {
        self.coordinator.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Supply the coordinator that owns the UI state collaborators.
    ///
    /// Must be called exactly once, before the first `attach`.
    pub fn configure(&mut self, coordinator: SharedCoordinator<A, R, S>) -> Result<(), BridgeError> {
        if self.coordinator.is_some() || self.attachment.is_some() {
            return Err(BridgeError::AlreadyConfigured);
        }
        self.coordinator = Some(coordinator);
        Ok(())
    }

    /// Remove every listener this router registered.
    ///
    /// Returns false if no runner was attached. Safe to call repeatedly.
    pub fn detach(&mut self) -> bool {
        let Some(attachment) = self.attachment.take() else {
            return false;
        };
        attachment
            .runner
            .events()
            .unsubscribe(attachment.runner_listener);
        self.bus.unsubscribe(attachment.bus_listener);
        info!("Runner detached");
        true
    }
}

impl<A, R, S> EventRouter<A, R, S>
where
    A: AppState + 'static,
    R: RunnablesStore + 'static,
    S: StatsStore + 'static,
{
    /// Register inbound handlers on `runner` and outbound handlers on the bus.
    pub fn attach(&mut self, runner: &RunnerChannel) -> Result<(), BridgeError> {
        let coordinator = self.coordinator.as_ref().ok_or(BridgeError::NotConfigured)?;
        if self.attachment.is_some() {
            return Err(BridgeError::AlreadyAttached);
        }

        let changes = lock(coordinator).changes();

        let runner_listener = {
            let coordinator = Arc::clone(coordinator);
            let changes = Arc::clone(&changes);
            let signals = Arc::clone(runner.signals());
            runner.events().subscribe(move |event: &RunnerEvent| {
                debug!(event = event.name(), "Routing runner event");
                // The guard is dropped before dispatch so the runner may react
                // to a signal by raising its next event synchronously.
                let outcome = lock(&coordinator).handle_event(event)?;
                outcome.dispatch(&changes, &signals)
            })
        };

        let bus_listener = {
            let coordinator = Arc::clone(coordinator);
            let signals = Arc::clone(runner.signals());
            self.bus.subscribe(move |command: &LocalCommand| {
                debug!(command = command.name(), "Routing local command");
                let outcome = lock(&coordinator).handle_command(command)?;
                outcome.dispatch(&changes, &signals)
            })
        };

        self.attachment = Some(Attachment {
            runner: runner.clone(),
            runner_listener,
            bus_listener,
        });
        info!("Runner attached");
        Ok(())
    }
}

impl<A, R, S> Drop for EventRouter<A, R, S> {
    fn drop(&mut self) {
        self.detach();
    }
}
