//! Runtime events: types and broadcast bus.
//!
//! Groups the event **data model** and the **bus** that carries it from the
//! scheduler, tick actors and the runner to the subscriber fan-out.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler`, `TickActor`, `runner::run_once`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: the scheduler's listener, which updates `AliveTracker` and
//!   fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
