//! Builder for [`Scheduler`].

use std::sync::Arc;

use super::{config::SchedulerConfig, scheduler::Scheduler};
use crate::engine::Termination;
use crate::subscribers::Subscribe;

/// Assembles a [`Scheduler`] from config, subscribers and a termination signal.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    termination: Option<Termination>,
}

impl SchedulerBuilder {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            termination: None,
        }
    }

    /// Event subscribers, each served by its own worker and queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Success signal shared with the acquisition job. A fresh one is used if unset.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Builds the scheduler.
    pub fn build(self) -> Scheduler {
        Scheduler::new(
            self.cfg,
            self.subscribers,
            self.termination.unwrap_or_default(),
        )
    }
}
