//! runbridge synchronization core
//!
//! Bridges a test runner's event stream with the UI state that presents it.
//!
//! ```text
//! Runner ──RunnerEvent──► EventRouter ──► LifecycleCoordinator ──► collaborators
//!   ▲                          │
//!   └──────RunnerSignal────────┘◄──LocalCommand── LocalCommandBus ◄── UI
//! ```
//!
//! Everything is synchronous: a publish returns only after every handler ran,
//! and handler errors propagate back to the publisher unchanged.
//!
//! # Example
//!
//! ```rust
//! use runbridge_core::{LocalCommand, RunnerEvent};
//! use runbridge_sync::memory::{MemoryAppState, MemoryRunnables, MemoryStats};
//! use runbridge_sync::{EventRouter, LifecycleCoordinator, LocalCommandBus, RunnerChannel};
//!
//! # fn main() -> Result<(), runbridge_sync::BridgeError> {
//! let bus = LocalCommandBus::new();
//! let runner = RunnerChannel::new();
//! runner.on_signal(|signal| {
//!     println!("runner received {}", signal.name());
//!     Ok(())
//! });
//!
//! let coordinator = LifecycleCoordinator::new(
//!     MemoryAppState::default(),
//!     MemoryRunnables::default(),
//!     MemoryStats::default(),
//! )
//! .into_shared();
//!
//! let mut router = EventRouter::new(bus.clone());
//! router.configure(coordinator)?;
//! router.attach(&runner)?;
//!
//! runner.raise(RunnerEvent::RunEnd)?;
//! bus.publish(LocalCommand::Restart)?;
//! # Ok(())
//! # }
//! ```

mod bus;
mod channel;
mod collaborators;
mod coordinator;
mod error;
pub mod memory;
mod router;
mod runner;

pub use bus::LocalCommandBus;
pub use channel::{EventChannel, Handler, ListenerId};
pub use collaborators::{AppState, RunnablesStore, StatsStore};
pub use coordinator::{LifecycleCoordinator, Outcome, SharedCoordinator, StateChange};
pub use error::BridgeError;
pub use router::EventRouter;
pub use runner::RunnerChannel;
