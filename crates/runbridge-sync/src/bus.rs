//! Local command bus for UI-originated intents.

use std::sync::Arc;

use runbridge_core::LocalCommand;
use tracing::trace;

use crate::channel::{EventChannel, ListenerId};
use crate::error::BridgeError;

/// In-process channel carrying [`LocalCommand`]s from the UI to the router.
///
/// The UI never touches the runner; it publishes here and the attached
/// [`EventRouter`](crate::EventRouter) translates each command into a runner
/// signal. Clones share the same listeners. Construct one per session so
/// independent sessions never observe each other's commands.
#[derive(Debug, Clone, Default)]
pub struct LocalCommandBus {
    channel: Arc<EventChannel<LocalCommand>>,
}

impl LocalCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a command, returning the first handler error.
    pub fn publish(&self, command: LocalCommand) -> Result<(), BridgeError> {
        trace!(command = command.name(), "Publishing local command");
        self.channel.publish(&command)
    }

    pub fn subscribe<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&LocalCommand) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        self.channel.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.channel.unsubscribe(id)
    }

    /// Drop every handler so the next test case starts from a clean bus.
    pub fn unsubscribe_all(&self) {
        self.channel.unsubscribe_all();
    }

    pub fn listener_count(&self) -> usize {
        self.channel.listener_count()
    }
}
