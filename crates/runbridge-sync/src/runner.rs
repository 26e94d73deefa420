//! Runner-side event transport.

use std::sync::Arc;

use runbridge_core::{RunnerEvent, RunnerSignal};
use tracing::trace;

use crate::channel::{EventChannel, ListenerId};
use crate::error::BridgeError;

/// The pair of channels connecting a runner to the core.
///
/// The runner raises [`RunnerEvent`]s and listens for [`RunnerSignal`]s; the
/// router does the opposite. Clones refer to the same runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerChannel {
    events: Arc<EventChannel<RunnerEvent>>,
    signals: Arc<EventChannel<RunnerSignal>>,
}

impl RunnerChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise an event from the runner side.
    pub fn raise(&self, event: RunnerEvent) -> Result<(), BridgeError> {
        trace!(event = event.name(), "Runner raised event");
        self.events.publish(&event)
    }

    /// Register a runner-side handler for signals.
    pub fn on_signal<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&RunnerSignal) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        self.signals.subscribe(handler)
    }

    pub fn events(&self) -> &Arc<EventChannel<RunnerEvent>> {
        &self.events
    }

    pub fn signals(&self) -> &Arc<EventChannel<RunnerSignal>> {
        &self.signals
    }
}
