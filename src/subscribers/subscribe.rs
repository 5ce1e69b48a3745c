//! # Subscriber trait.
//!
//! Each subscriber is driven by its own worker, fed by a bounded queue owned
//! by the [`SubscriberSet`](crate::subscribers::SubscriberSet). A slow
//! subscriber only delays itself; when its queue is full, events for it are
//! dropped and a `SubscriberOverflow` event is published.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
