//! # Jitter policy for request pacing.
//!
//! [`JitterPolicy`] adds randomness on top of the fixed pause between inventory
//! requests so that the request cadence is not perfectly periodic.
//!
//! - [`JitterPolicy::None`]: no randomization, the pause is exact
//! - [`JitterPolicy::Full`]: extra delay in [0, pause]
//! - [`JitterPolicy::Equal`]: extra delay in [0, pause/2]
//!
//! Jitter only ever **lengthens** the pause; the configured pause is a floor.

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Policy controlling randomization of request pauses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterPolicy {
    /// No jitter: use the exact pause.
    #[default]
    None,

    /// Full jitter: pause + random[0, pause].
    Full,

    /// Equal jitter: pause + random[0, pause/2].
    Equal,
}

impl JitterPolicy {
    /// Returns `pause` plus this policy's random extra.
    pub fn apply(&self, pause: Duration) -> Duration {
        match self {
            JitterPolicy::None => pause,
            JitterPolicy::Full => pause + Self::random_up_to(pause),
            JitterPolicy::Equal => pause + Self::random_up_to(pause / 2),
        }
    }

    fn random_up_to(bound: Duration) -> Duration {
        let ms = bound.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=ms))
    }
}
