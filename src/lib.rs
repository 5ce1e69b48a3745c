//! # slotvisor
//!
//! **Slotvisor** watches an appointment inventory and races to reserve one
//! slot with a senior provider.
//!
//! Three periodic jobs share one cache of claimable candidates:
//!
//! ```text
//!   discovery (300s, fires at start)   availability (5s)      acquisition (1s)
//!          │                                  │                      │
//!          ▼                                  ▼                      │
//!   list_providers ─► TierFilter ──cascade──► rebuild():             │
//!                                      for provider (sequential, paced):
//!                                        list_availability           │
//!                                        └─ open windows            │
//!                                            └─ list_sub_slots      │
//!                                      replace() ─► ┌──────────────────┴─┐
//!                                                   │  CandidateCache    │
//!                                                   │  (one lock, whole  │
//!                                                   │   generations)     │
//!                                                   └──────────┬─────────┘
//!                                                              ▼
//!                                         for candidate in reverse:
//!                                           claim ─► confirm ─► Termination
//! ```
//!
//! ## Runtime
//! ```text
//! TickSpec ──► Scheduler ──► TickActor (per job) ──► run_once (per tick)
//!                  │               │
//!                  │               └─ publish TickStarting / TickCompleted / TickFailed
//!                  ▼
//!                 Bus ──► listener ──► AliveTracker
//!                                  └─► SubscriberSet ──► LogWriter (tracing)
//!
//! first of:  Termination fired ─► Reserved(reservation)
//!            OS signal         ─► Interrupted
//! then:      cancel runtime token ─► wait up to grace ─► GraceExceeded?
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Inventory**     | Remote operations behind one async trait; HTTP implementation. | [`Inventory`], [`HttpInventory`]               |
//! | **Engine**        | Cache, refresh pipeline, acquisition, one-shot termination.   | [`Engine`], [`CandidateCache`], [`Acquirer`]    |
//! | **Scheduling**    | Fixed-period jobs, timeouts, graceful shutdown.               | [`Scheduler`], [`TickSpec`], [`RunOutcome`]     |
//! | **Subscriber API**| Observe tick lifecycle events.                                | [`Subscribe`], [`LogWriter`]                    |
//! | **Policies**      | Request pacing with optional jitter.                          | [`PacingPolicy`], [`JitterPolicy`]              |
//! | **Errors**        | Typed errors with stable labels.                              | [`InventoryError`], [`TaskError`], [`RuntimeError`], [`ConfigError`] |
//! | **Configuration** | File + environment settings, credentials hot reload.         | [`Settings`], [`CredentialsReloader`], [`ConfigWatcher`] |
//!
//! ## Example
//! ```rust,no_run
//! use std::path::PathBuf;
//! use slotvisor::{App, RunOutcome, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = PathBuf::from("config.yaml");
//!     let settings = Settings::load(&path)?;
//!
//!     match App::new(settings, path)?.run().await? {
//!         RunOutcome::Reserved(reservation) => println!("{}", reservation.order_id),
//!         other => eprintln!("stopped without a reservation: {other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod core;
mod engine;
mod error;
mod events;
mod inventory;
mod model;
mod policies;
mod subscribers;
mod tasks;

pub mod logging;

// ---- Public re-exports ----

pub use crate::app::{App, CONFIG_RELOAD, FALLBACK_RELOAD};
pub use crate::config::{
    ConfigWatcher, Credentials, CredentialsReloader, InventorySettings, ScheduleSettings, Settings,
};
pub use crate::core::{RunOutcome, Scheduler, SchedulerBuilder, SchedulerConfig};
pub use crate::engine::{
    ACQUISITION, AVAILABILITY, Acquirer, AttemptOutcome, CacheGuard, CandidateCache, DEFAULT_TIERS,
    DISCOVERY, DiscoveryOutcome, Engine, RefreshOutcome, RefreshPipeline, Termination, TierFilter,
};
pub use crate::error::{ConfigError, InventoryError, RuntimeError, TaskError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::inventory::{HttpInventory, Inventory, InventoryRef, RawResponse, ReqwestTransport, Transport};
pub use crate::model::{AvailabilityWindow, Candidate, ClaimTicket, OrderId, Provider, Reservation, SubSlot};
pub use crate::policies::{JitterPolicy, PacingPolicy};
pub use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use crate::tasks::{BoxTaskFuture, FirstTick, Task, TaskFn, TaskRef, TickSpec};
