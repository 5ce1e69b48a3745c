//! # Pacing policy between inventory requests.
//!
//! The availability refresh issues its per-provider queries one at a time and
//! waits [`PacingPolicy::delay`] after each provider. This bounds the request
//! rate against the inventory; it is not needed for correctness.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::JitterPolicy;

/// Delay inserted between consecutive per-provider queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Minimum pause.
    pub pause: Duration,
    /// Random extra on top of `pause`.
    pub jitter: JitterPolicy,
}

impl Default for PacingPolicy {
    /// `pause = 200ms`, no jitter.
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(200),
            jitter: JitterPolicy::None,
        }
    }
}

impl PacingPolicy {
    /// No pause at all.
    pub const fn none() -> Self {
        Self {
            pause: Duration::ZERO,
            jitter: JitterPolicy::None,
        }
    }

    /// Next pause, never shorter than `pause`.
    pub fn delay(&self) -> Duration {
        self.jitter.apply(self.pause)
    }

    /// Sleeps for the next pause. Returns `false` if `ctx` was cancelled first.
    pub async fn wait(&self, ctx: &CancellationToken) -> bool {
        let delay = self.delay();
        if delay.is_zero() {
            return !ctx.is_cancelled();
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = ctx.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_sleeps_at_least_the_pause() {
        let policy = PacingPolicy {
            pause: Duration::from_millis(200),
            jitter: JitterPolicy::None,
        };
        let started = tokio::time::Instant::now();
        assert!(policy.wait(&CancellationToken::new()).await);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_is_cut_short_by_cancellation() {
        let policy = PacingPolicy {
            pause: Duration::from_secs(60),
            jitter: JitterPolicy::None,
        };
        let ctx = CancellationToken::new();
        ctx.cancel();
        let started = tokio::time::Instant::now();
        assert!(!policy.wait(&ctx).await);
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
