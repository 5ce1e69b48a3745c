//! # TickActor: drives one periodic job.
//!
//! ```text
//! TickSpec ──► Scheduler ──► TickActor::run()
//!
//! ticker = interval_at(first, period), missed ticks skipped
//! loop {
//!   ├─► wait next tick  (or cancellation → exit)
//!   ├─► tick += 1
//!   ├─► publish TickStarting
//!   └─► run_once(task, timeout, tick) ──► TickCompleted / TickFailed
//! }
//! ```
//!
//! ## Rules
//! - Ticks of one job run **sequentially**; a tick never overlaps the previous one.
//! - A tick that outlasts the period causes the missed slots to be **skipped**,
//!   not replayed in a burst.
//! - A failed tick is not retried; the next scheduled tick runs as usual.
//! - Cancellation is observed between ticks and, via the child token, inside them.

use std::time::Duration;

use tokio::{
    select,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    core::runner::run_once,
    events::{Bus, Event, EventKind},
    tasks::{FirstTick, TaskRef},
};

/// Schedule parameters extracted from a [`TickSpec`](crate::TickSpec).
#[derive(Clone, Copy, Debug)]
pub struct TickActorParams {
    pub interval: Duration,
    pub first_tick: FirstTick,
    pub timeout: Option<Duration>,
}

/// Runs one job's ticks until cancelled.
pub struct TickActor {
    task: TaskRef,
    params: TickActorParams,
    bus: Bus,
}

impl TickActor {
    pub fn new(bus: Bus, task: TaskRef, params: TickActorParams) -> Self {
        Self { task, params, bus }
    }

    /// Main loop; returns once `runtime_token` is cancelled.
    pub async fn run(self, runtime_token: CancellationToken) {
        let first = match self.params.first_tick {
            FirstTick::Immediately => Instant::now(),
            FirstTick::AfterInterval => Instant::now() + self.params.interval,
        };
        let mut ticker = time::interval_at(first, self.params.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut tick: u64 = 0;
        loop {
            select! {
                biased;
                _ = runtime_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tick += 1;
            self.bus.publish(
                Event::new(EventKind::TickStarting)
                    .with_task(self.task.name())
                    .with_tick(tick),
            );
            let _ = run_once(
                self.task.as_ref(),
                &runtime_token,
                self.params.timeout,
                tick,
                &self.bus,
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;
    use std::sync::{Arc, Mutex};

    fn recording_task(
        name: &'static str,
        work: Duration,
        fail: bool,
    ) -> (TaskRef, Arc<Mutex<Vec<Instant>>>) {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let task = {
            let starts = Arc::clone(&starts);
            TaskFn::arc(name, move |_ctx: CancellationToken| {
                let starts = Arc::clone(&starts);
                async move {
                    starts.lock().unwrap().push(Instant::now());
                    time::sleep(work).await;
                    if fail {
                        return Err(TaskError::Fail { error: "nope".into() });
                    }
                    Ok(())
                }
            })
        };
        (task, starts)
    }

    fn params(secs: u64, first_tick: FirstTick) -> TickActorParams {
        TickActorParams {
            interval: Duration::from_secs(secs),
            first_tick,
            timeout: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_interval() {
        let (task, starts) = recording_task("acquisition", Duration::ZERO, false);
        let token = CancellationToken::new();
        let origin = Instant::now();
        let handle = tokio::spawn(
            TickActor::new(Bus::new(64), task, params(5, FirstTick::AfterInterval))
                .run(token.clone()),
        );

        time::sleep(Duration::from_millis(10_500)).await;
        token.cancel();
        handle.await.unwrap();

        let offsets: Vec<u64> = starts
            .lock()
            .unwrap()
            .iter()
            .map(|t| (*t - origin).as_secs())
            .collect();
        assert_eq!(offsets, vec![5, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_schedule() {
        let (task, starts) = recording_task("discovery", Duration::ZERO, true);
        let token = CancellationToken::new();
        let handle = tokio::spawn(
            TickActor::new(Bus::new(64), task, params(1, FirstTick::Immediately))
                .run(token.clone()),
        );

        time::sleep(Duration::from_millis(3_500)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(starts.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_never_overlap_and_skip_missed_slots() {
        let (task, starts) = recording_task("availability", Duration::from_millis(2_500), false);
        let token = CancellationToken::new();
        let origin = Instant::now();
        let handle = tokio::spawn(
            TickActor::new(Bus::new(64), task, params(1, FirstTick::Immediately))
                .run(token.clone()),
        );

        time::sleep(Duration::from_millis(6_000)).await;
        token.cancel();
        handle.await.unwrap();

        let starts = starts.lock().unwrap();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(2_500));
        }
        assert_eq!((starts[0] - origin).as_millis(), 0);
        assert!(starts.len() <= 3);
    }
}
