//! Synchronous in-process publish/subscribe primitive.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::BridgeError;

/// A registered event handler.
pub type Handler<E> = Arc<dyn Fn(&E) -> Result<(), BridgeError> + Send + Sync>;

/// Handle returned by [`EventChannel::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Handler<E>)>,
}

/// Ordered, synchronous event channel.
///
/// `publish` runs every handler to completion, in registration order, before
/// returning. The first handler error stops dispatch and is returned to the
/// publisher. The listener list is snapshotted before dispatch, so handlers
/// may publish, subscribe, or unsubscribe re-entrantly; changes take effect
/// from the next publish.
pub struct EventChannel<E> {
    listeners: Mutex<Listeners<E>>,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Register a handler and return its id.
    pub fn subscribe<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&E) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    /// Remove every handler.
    pub fn unsubscribe_all(&self) {
        lock(&self.listeners).entries.clear();
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    /// Deliver `event` to every handler registered at the time of the call.
    pub fn publish(&self, event: &E) -> Result<(), BridgeError> {
        let handlers: Vec<Handler<E>> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event)?;
        }
        Ok(())
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Lock a mutex, recovering the guard if a handler panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
