//! Runtime core: periodic job orchestration and lifecycle.
//!
//! - [`scheduler`]: spawns actors, decides the run outcome, grace shutdown;
//! - [`actor`]: runs one job's ticks on a fixed period;
//! - [`runner`]: executes one tick with timeout and event publishing;
//! - [`alive`]: tracks which jobs are mid-tick;
//! - [`shutdown`]: OS signal handling;
//! - [`config`]: scheduler knobs;
//! - [`builder`]: fluent construction of the [`Scheduler`].

mod actor;
mod alive;
mod builder;
mod config;
mod runner;
mod scheduler;
mod shutdown;

pub use builder::SchedulerBuilder;
pub use config::SchedulerConfig;
pub use scheduler::{RunOutcome, Scheduler};
