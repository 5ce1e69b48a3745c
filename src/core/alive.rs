//! # In-flight tick tracker.
//!
//! Records which jobs are mid-tick, so the scheduler can name the stuck ones
//! when the shutdown grace period runs out.
//!
//! ```text
//! Bus ──► scheduler listener ──► AliveTracker::update()
//!                                      │
//!                                      ▼
//!                         HashMap<job, {last_seq, in_tick}>
//! ```
//!
//! ## Rules
//! - `TickStarting` marks a job in flight; `TickCompleted` / `TickFailed` clear it.
//! - Events with `seq <= last_seq` for that job are ignored as stale.
//! - Reads are eventually consistent with the bus.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone)]
struct JobState {
    last_seq: Option<u64>,
    in_tick: bool,
}

/// Tracks which jobs are currently running a tick.
#[derive(Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<String, JobState>>,
}

impl AliveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `ev`; returns `true` if the in-flight state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(name) = ev.task.as_deref() else {
            return false;
        };
        let in_tick = match ev.kind {
            EventKind::TickStarting => true,
            EventKind::TickCompleted | EventKind::TickFailed => false,
            _ => return false,
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(JobState {
            last_seq: None,
            in_tick: false,
        });
        if entry.last_seq.is_some_and(|last| ev.seq <= last) {
            return false;
        }
        entry.last_seq = Some(ev.seq);
        let changed = entry.in_tick != in_tick;
        entry.in_tick = in_tick;
        changed
    }

    /// Sorted names of jobs currently mid-tick.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, s)| s.in_tick)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, task: &str) -> Event {
        Event::new(kind).with_task(task)
    }

    #[tokio::test]
    async fn tracks_ticks_in_flight() {
        let alive = AliveTracker::new();
        assert!(alive.update(&ev(EventKind::TickStarting, "discovery")).await);
        assert!(alive.update(&ev(EventKind::TickStarting, "acquisition")).await);
        assert!(alive.update(&ev(EventKind::TickCompleted, "discovery")).await);

        assert_eq!(alive.snapshot().await, vec!["acquisition".to_string()]);
    }

    #[tokio::test]
    async fn stale_events_are_ignored() {
        let alive = AliveTracker::new();
        let start = ev(EventKind::TickStarting, "availability");
        let stop = ev(EventKind::TickFailed, "availability");

        assert!(alive.update(&start).await);
        assert!(alive.update(&stop).await);
        assert!(!alive.update(&start).await);
        assert!(alive.snapshot().await.is_empty());
    }
}
