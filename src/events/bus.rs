//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so that tick actors, the runner and
//! the scheduler can publish without blocking.
//!
//! ```text
//! Publishers (many):                 Listener (one):
//!   discovery    ──┐
//!   availability ──┼────► Bus ──────► scheduler listener ──► AliveTracker
//!   acquisition  ──┤  (broadcast)                        └─► SubscriberSet
//!   runner       ──┘
//! ```
//!
//! ## Rules
//! - `publish()` never blocks.
//! - One ring buffer of `capacity` recent events is shared by all receivers.
//! - A lagging receiver gets `RecvError::Lagged(n)` and skips the `n` oldest.
//! - Events sent while nobody is subscribed are lost.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes to all current receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver for events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
