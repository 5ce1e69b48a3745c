//! # Schedule of one periodic job.
//!
//! [`TickSpec`] bundles a [`TaskRef`] with:
//! - the fixed period between ticks,
//! - whether the first tick fires at start or after one period ([`FirstTick`]),
//! - an optional per-tick timeout.
//!
//! Built explicitly with [`TickSpec::new`] or from scheduler defaults with
//! [`TickSpec::with_defaults`]. Specs are handed to
//! [`Scheduler::run`](crate::Scheduler::run).

use std::time::Duration;

use crate::{core::SchedulerConfig, tasks::task::TaskRef};

/// Shortest accepted period; shorter values are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// When the first tick of a job fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FirstTick {
    /// At scheduler start.
    Immediately,
    /// One full period after start.
    #[default]
    AfterInterval,
}

/// Task plus its tick schedule.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use slotvisor::{FirstTick, SchedulerConfig, TaskError, TaskFn, TaskRef, TickSpec};
///
/// let discovery: TaskRef = TaskFn::arc("discovery", |_ctx: CancellationToken| async move {
///     Ok::<(), TaskError>(())
/// });
///
/// let spec = TickSpec::new(discovery.clone(), Duration::from_secs(5))
///     .with_first_tick(FirstTick::Immediately);
/// assert!(spec.timeout().is_none());
///
/// let cfg = SchedulerConfig::default();
/// let inherited = TickSpec::with_defaults(discovery, Duration::from_secs(1), &cfg);
/// assert_eq!(inherited.first_tick(), FirstTick::AfterInterval);
/// ```
#[derive(Clone)]
pub struct TickSpec {
    task: TaskRef,
    interval: Duration,
    first_tick: FirstTick,
    timeout: Option<Duration>,
}

impl TickSpec {
    /// Creates a spec that first fires after one `interval`, with no timeout.
    pub fn new(task: TaskRef, interval: Duration) -> Self {
        Self {
            task,
            interval: interval.max(MIN_INTERVAL),
            first_tick: FirstTick::default(),
            timeout: None,
        }
    }

    /// Creates a spec inheriting the per-tick timeout from `cfg`.
    pub fn with_defaults(task: TaskRef, interval: Duration, cfg: &SchedulerConfig) -> Self {
        Self::new(task, interval).with_timeout(cfg.default_timeout())
    }

    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn first_tick(&self) -> FirstTick {
        self.first_tick
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn with_first_tick(mut self, first_tick: FirstTick) -> Self {
        self.first_tick = first_tick;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
