//! # Runtime events emitted by the scheduler and tick actors.
//!
//! [`EventKind`] falls into three groups:
//! - **Tick lifecycle**: starting, completed, failed, timeout
//! - **Run outcome**: reservation confirmed, shutdown requested, grace results
//! - **Subscriber health**: overflow and panic
//!
//! [`Event`] carries the timestamp, job name, tick number and an optional
//! reason or timeout.
//!
//! ## Ordering
//! `seq` is a process-wide monotonic counter; use it to restore publish order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use slotvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TickFailed)
//!     .with_task("availability")
//!     .with_reason("timed out after 5s")
//!     .with_tick(12)
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::TickFailed);
//! assert_eq!(ev.tick, Some(12));
//! assert_eq!(ev.timeout_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A job began a tick. Sets `task`, `tick`.
    TickStarting,

    /// A tick finished, successfully or by honoring cancellation.
    /// Sets `task`, `tick`.
    TickCompleted,

    /// A tick returned an error. The next tick still runs on schedule.
    /// Sets `task`, `tick`, `reason`.
    TickFailed,

    /// A tick ran past its timeout and was cancelled; `TickFailed` follows.
    /// Sets `task`, `tick`, `timeout_ms`.
    TimeoutHit,

    /// The acquisition job confirmed a reservation; the run is ending.
    /// Sets `reason` (the order id).
    ReservationConfirmed,

    /// An OS termination signal was observed.
    ShutdownRequested,

    /// All jobs stopped within the grace period.
    AllStoppedWithin,

    /// The grace period ran out with ticks still in flight.
    GraceExceeded,

    /// A subscriber dropped an event. Sets `task` (subscriber), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event. Sets `task`, `reason`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Job (or subscriber) name.
    pub task: Option<Arc<str>>,
    /// Tick number within the job, starting from 1.
    pub tick: Option<u64>,
    /// Human-readable detail.
    pub reason: Option<Arc<str>>,
    /// Tick timeout in milliseconds.
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            tick: None,
            reason: None,
            timeout_ms: None,
        }
    }

    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Stores the timeout as milliseconds, saturating at `u32::MAX`.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
