//! # LogWriter: runtime events rendered through `tracing`.
//!
//! Maps each [`EventKind`] onto a structured log record under the
//! `slotvisor::events` target:
//!
//! ```text
//! DEBUG tick starting    task="availability" tick=12
//! WARN  tick failed      task="discovery" tick=3 reason="..."
//! INFO  reservation confirmed order_id="123456"
//! ERROR grace period exceeded
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that writes every event to the `tracing` pipeline.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::TickStarting => {
                trace!(target: "slotvisor::events", task, tick = e.tick, "tick starting");
            }
            EventKind::TickCompleted => {
                trace!(target: "slotvisor::events", task, tick = e.tick, "tick completed");
            }
            EventKind::TickFailed => {
                warn!(target: "slotvisor::events", task, tick = e.tick, reason, "tick failed");
            }
            EventKind::TimeoutHit => {
                warn!(target: "slotvisor::events", task, tick = e.tick, timeout_ms = e.timeout_ms, "tick timed out");
            }
            EventKind::ReservationConfirmed => {
                info!(target: "slotvisor::events", order_id = reason, "reservation confirmed");
            }
            EventKind::ShutdownRequested => {
                info!(target: "slotvisor::events", "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                debug!(target: "slotvisor::events", "all jobs stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!(target: "slotvisor::events", "grace period exceeded");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "slotvisor::events", subscriber = task, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "slotvisor::events", subscriber = task, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
