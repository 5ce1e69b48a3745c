//! # One tick of a job.
//!
//! [`run_once`] drives a single tick future with an optional timeout and
//! publishes its terminal event.
//!
//! ```text
//! Ok(())             → TickCompleted
//! Err(Canceled)      → TickCompleted  (cancellation honored)
//! Err(Fail)          → TickFailed
//! timeout elapsed    → cancel child → TimeoutHit → TickFailed
//! ```
//!
//! ## Rules
//! - Exactly one terminal event per tick: `TickCompleted` or `TickFailed`.
//! - Each tick gets a child token; cancelling it never touches the parent.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::Task,
};

/// Runs tick number `tick` of `task`, publishing its outcome to `bus`.
pub async fn run_once<T: Task + ?Sized>(
    task: &T,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    tick: u64,
    bus: &Bus,
) -> Result<(), TaskError> {
    let child = parent.child_token();

    let res = match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, task.spawn(child.clone())).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                bus.publish(
                    Event::new(EventKind::TimeoutHit)
                        .with_task(task.name())
                        .with_tick(tick)
                        .with_timeout(dur),
                );
                Err(TaskError::Timeout { timeout: dur })
            }
        },
        None => task.spawn(child.clone()).await,
    };

    match res {
        Ok(()) | Err(TaskError::Canceled) => {
            bus.publish(
                Event::new(EventKind::TickCompleted)
                    .with_task(task.name())
                    .with_tick(tick),
            );
        }
        Err(ref e) => {
            bus.publish(
                Event::new(EventKind::TickFailed)
                    .with_task(task.name())
                    .with_tick(tick)
                    .with_reason(e.to_string()),
            );
        }
    }
    res
}
