//! # Scheduler: runs the periodic jobs until a reservation or a signal.
//!
//! The [`Scheduler`] owns the event bus, the subscribers and the
//! [`AliveTracker`]. It spawns one [`TickActor`] per [`TickSpec`] and decides
//! how the run ends.
//!
//! ```text
//! run(specs):
//!   runtime_token = termination.token().child_token()
//!   listener: Bus ──► AliveTracker::update ──► SubscriberSet::emit
//!   spawn TickActor per spec (child of runtime_token)
//!
//!   first of:
//!     termination fired   ──► ReservationConfirmed ──► Reserved(reservation)
//!     OS signal           ──► ShutdownRequested    ──► Interrupted
//!     every actor exited  ──────────────────────────► Drained
//!
//!   runtime_token.cancel()
//!   wait up to grace:
//!     ├─ all joined  → AllStoppedWithin
//!     └─ elapsed     → GraceExceeded (+ AliveTracker snapshot)
//!   reservation confirmed meanwhile? ──► Reserved
//!   stop listener, drain subscriber queues
//! ```
//!
//! ## Rules
//! - Once termination fires no new tick starts: the runtime token is its child.
//! - A tick still running when a signal arrives may confirm a reservation
//!   during the grace period; the run then reports that reservation.
//! - A confirmed reservation is reported even if some tick then outlives the
//!   grace period; the overrun is logged instead.
//! - Every event published before `run` returns reaches the subscribers.

use std::future::Future;
use std::sync::Arc;

use tokio::{
    sync::broadcast::error::{RecvError, TryRecvError},
    task::{JoinHandle, JoinSet},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::core::{
    actor::{TickActor, TickActorParams},
    alive::AliveTracker,
    config::SchedulerConfig,
    shutdown,
};
use crate::engine::Termination;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::model::Reservation;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TickSpec;

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// A reservation was confirmed.
    Reserved(Reservation),
    /// An OS termination signal arrived first.
    Interrupted,
    /// Every job exited on its own (no specs, or all cancelled externally).
    Drained,
}

/// Coordinates tick actors, event delivery and graceful shutdown.
pub struct Scheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    alive: Arc<AliveTracker>,
    termination: Termination,
}

impl Scheduler {
    pub fn new(
        cfg: SchedulerConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        termination: Termination,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
            alive: Arc::new(AliveTracker::new()),
            termination,
        }
    }

    /// Runs `specs` until termination, an OS signal, or all actors exiting.
    pub async fn run(&self, specs: Vec<TickSpec>) -> Result<RunOutcome, RuntimeError> {
        self.run_until(specs, os_signal()).await
    }

    /// Like [`run`](Self::run), with `interrupt` standing in for the OS signal.
    pub async fn run_until<F>(&self, specs: Vec<TickSpec>, interrupt: F) -> Result<RunOutcome, RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let runtime_token = self.termination.token().child_token();
        let listener_stop = CancellationToken::new();
        let listener = self.subscriber_listener(listener_stop.clone());

        let mut set = JoinSet::new();
        self.spawn_tick_actors(&mut set, &runtime_token, specs);
        let res = self.drive_shutdown(&mut set, &runtime_token, interrupt).await;

        listener_stop.cancel();
        if let Err(e) = listener.await {
            warn!(error = %e, "event listener ended abnormally");
        }
        res
    }

    /// Spawns the bus listener. On `stop` it delivers whatever is already
    /// queued, then drains every subscriber queue.
    fn subscriber_listener(&self, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());
        let alive = Arc::clone(&self.alive);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => {
                            alive.update(&ev).await;
                            set.emit(&ev);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => {
                        alive.update(&ev).await;
                        set.emit(&ev);
                    }
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged");
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    fn spawn_tick_actors(
        &self,
        set: &mut JoinSet<()>,
        runtime_token: &CancellationToken,
        specs: Vec<TickSpec>,
    ) {
        for spec in specs {
            let actor = TickActor::new(
                self.bus.clone(),
                Arc::clone(spec.task()),
                TickActorParams {
                    interval: spec.interval(),
                    first_tick: spec.first_tick(),
                    timeout: spec.timeout(),
                },
            );
            set.spawn(actor.run(runtime_token.child_token()));
        }
    }

    async fn drive_shutdown<F>(
        &self,
        set: &mut JoinSet<()>,
        runtime_token: &CancellationToken,
        interrupt: F,
    ) -> Result<RunOutcome, RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            biased;
            reservation = self.termination.wait() => match reservation {
                Some(reservation) => {
                    self.bus.publish(
                        Event::new(EventKind::ReservationConfirmed)
                            .with_reason(reservation.order_id.as_str()),
                    );
                    RunOutcome::Reserved(reservation)
                }
                None => RunOutcome::Interrupted,
            },
            _ = interrupt => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                RunOutcome::Interrupted
            }
            _ = async { while set.join_next().await.is_some() {} } => {
                return Ok(match self.termination.reservation() {
                    Some(reservation) => RunOutcome::Reserved(reservation.clone()),
                    None => RunOutcome::Drained,
                });
            }
        };

        runtime_token.cancel();
        let waited = self.wait_all_with_grace(set).await;
        let outcome = match (outcome, self.termination.reservation()) {
            (RunOutcome::Interrupted, Some(reservation)) => {
                self.bus.publish(
                    Event::new(EventKind::ReservationConfirmed)
                        .with_reason(reservation.order_id.as_str()),
                );
                RunOutcome::Reserved(reservation.clone())
            }
            (outcome, _) => outcome,
        };

        match waited {
            Ok(()) => Ok(outcome),
            Err(e) if matches!(outcome, RunOutcome::Reserved(_)) => {
                error!(error = %e, label = e.as_label(), "jobs outlived the grace period after a reservation");
                Ok(outcome)
            }
            Err(e) => Err(e),
        }
    }

    async fn wait_all_with_grace(&self, set: &mut JoinSet<()>) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async { while set.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot().await;
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

/// Completes on an OS termination signal; never, if handlers are unavailable.
async fn os_signal() {
    if let Err(e) = shutdown::wait_for_shutdown_signal().await {
        warn!(error = %e, "signal handlers unavailable; only a reservation ends the run");
        std::future::pending::<()>().await;
    }
}
