//! Request pacing policies.
//!
//! This module groups the knobs that control **how fast** the engine talks to
//! the inventory. There is no retry/backoff knob: a failed tick is retried by the
//! next scheduled tick.
//!
//! ## Contents
//! - [`PacingPolicy`] pause inserted after each provider's queries
//! - [`JitterPolicy`] randomization that only lengthens that pause
//!
//! ## Defaults
//! - `PacingPolicy::default()` → pause=200ms, jitter=None.

mod jitter;
mod pacing;

pub use jitter::JitterPolicy;
pub use pacing::PacingPolicy;
