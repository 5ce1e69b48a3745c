//! # Event subscribers.
//!
//! Subscribers observe the runtime events published on the
//! [`Bus`](crate::events::Bus) without slowing the jobs that publish them.
//!
//! ```text
//! tick actor ── publish(Event) ──► Bus ──► scheduler listener ──► SubscriberSet
//!                                                                 ├──► LogWriter
//!                                                                 └──► custom ...
//! ```
//!
//! ## Implementing a subscriber
//! ```no_run
//! use async_trait::async_trait;
//! use slotvisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TickFailed {
//!             // count it
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
