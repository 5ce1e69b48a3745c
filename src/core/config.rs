//! # Scheduler runtime configuration.
//!
//! [`SchedulerConfig`] is used in two places:
//! 1. building the [`Scheduler`](crate::Scheduler);
//! 2. as defaults for [`TickSpec::with_defaults`](crate::TickSpec::with_defaults).
//!
//! `tick_timeout = 0s` means no per-tick timeout.

use std::time::Duration;

use crate::config::ScheduleSettings;

/// Runtime knobs of the scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// How long in-flight ticks may take to honor cancellation at shutdown.
    pub grace: Duration,

    /// Ring buffer size of the event bus (min 1).
    pub bus_capacity: usize,

    /// Default per-tick timeout (`0s` = none).
    pub tick_timeout: Duration,
}

impl SchedulerConfig {
    /// Per-tick timeout as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.tick_timeout == Duration::ZERO {
            None
        } else {
            Some(self.tick_timeout)
        }
    }

    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// `grace = 10s`, `bus_capacity = 1024`, no tick timeout.
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
            tick_timeout: Duration::ZERO,
        }
    }
}

impl From<&ScheduleSettings> for SchedulerConfig {
    fn from(s: &ScheduleSettings) -> Self {
        Self {
            grace: s.grace(),
            tick_timeout: s.tick_timeout().unwrap_or(Duration::ZERO),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_none() {
        assert_eq!(SchedulerConfig::default().default_timeout(), None);
        let cfg = SchedulerConfig {
            tick_timeout: Duration::from_millis(1500),
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.default_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn built_from_schedule_settings() {
        let settings = ScheduleSettings::default();
        let cfg = SchedulerConfig::from(&settings);
        assert_eq!(cfg.grace, settings.grace());
        assert_eq!(cfg.default_timeout(), settings.tick_timeout());
    }
}
