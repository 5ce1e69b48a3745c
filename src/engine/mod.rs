//! # Reservation engine.
//!
//! Everything between the inventory and the scheduler:
//!
//! ```text
//!            discovery tick ──► RefreshPipeline::refresh_providers ──┐ (cascade)
//!         availability tick ──► RefreshPipeline::refresh_availability ┤
//!                                                                    ▼
//!                                                         CandidateCache (one lock)
//!                                                                    ▲
//!          acquisition tick ──► Acquirer::attempt ───────────────────┘
//!                                      │ success
//!                                      ▼
//!                                 Termination ──► Scheduler stops
//! ```
//!
//! [`Engine`] wires these parts around one inventory and exposes the three
//! jobs as [`TickSpec`]s.

mod acquisition;
mod cache;
mod eligibility;
mod pipeline;
mod termination;

pub use acquisition::{Acquirer, AttemptOutcome};
pub use cache::{CacheGuard, CandidateCache};
pub use eligibility::{DEFAULT_TIERS, TierFilter};
pub use pipeline::{DiscoveryOutcome, RefreshOutcome, RefreshPipeline};
pub use termination::Termination;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ScheduleSettings;
use crate::core::SchedulerConfig;
use crate::error::TaskError;
use crate::inventory::InventoryRef;
use crate::policies::PacingPolicy;
use crate::tasks::{FirstTick, TaskFn, TickSpec};

/// Job names, as they appear in events and logs.
pub const DISCOVERY: &str = "discovery";
pub const AVAILABILITY: &str = "availability";
pub const ACQUISITION: &str = "acquisition";

/// The cache, its writers, its reader and the success signal, wired together.
pub struct Engine {
    cache: Arc<CandidateCache>,
    pipeline: Arc<RefreshPipeline>,
    acquirer: Arc<Acquirer>,
    termination: Termination,
}

impl Engine {
    pub fn new(
        inventory: InventoryRef,
        filter: TierFilter,
        pacing: PacingPolicy,
        termination: Termination,
    ) -> Self {
        let cache = Arc::new(CandidateCache::new());
        let pipeline = Arc::new(RefreshPipeline::new(
            Arc::clone(&inventory),
            Arc::clone(&cache),
            filter,
            pacing,
        ));
        let acquirer = Arc::new(Acquirer::new(inventory, Arc::clone(&cache), termination.clone()));
        Self {
            cache,
            pipeline,
            acquirer,
            termination,
        }
    }

    pub fn cache(&self) -> &Arc<CandidateCache> {
        &self.cache
    }

    pub fn pipeline(&self) -> &Arc<RefreshPipeline> {
        &self.pipeline
    }

    pub fn acquirer(&self) -> &Arc<Acquirer> {
        &self.acquirer
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    /// The three engine jobs.
    ///
    /// Discovery fires at start so the first roster and candidates are ready
    /// as soon as possible; the other two first fire after one period.
    ///
    /// Acquisition never gets a tick timeout: dropping a tick between a claim
    /// and its confirm could leave an order committed but unreported.
    pub fn tick_specs(&self, schedule: &ScheduleSettings, cfg: &SchedulerConfig) -> Vec<TickSpec> {
        let discovery = {
            let pipeline = Arc::clone(&self.pipeline);
            TaskFn::arc(DISCOVERY, move |ctx: CancellationToken| {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    let outcome = pipeline.refresh_providers(&ctx).await;
                    debug!(providers = outcome.providers, refresh = ?outcome.refresh, "discovery done");
                    if outcome.refresh.is_none() {
                        return Err(TaskError::Canceled);
                    }
                    Ok(())
                }
            })
        };

        let availability = {
            let pipeline = Arc::clone(&self.pipeline);
            TaskFn::arc(AVAILABILITY, move |ctx: CancellationToken| {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    match pipeline.refresh_availability(&ctx).await {
                        Some(_) => Ok(()),
                        None => Err(TaskError::Canceled),
                    }
                }
            })
        };

        let acquisition = {
            let acquirer = Arc::clone(&self.acquirer);
            TaskFn::arc(ACQUISITION, move |ctx: CancellationToken| {
                let acquirer = Arc::clone(&acquirer);
                async move {
                    match acquirer.attempt(&ctx).await {
                        AttemptOutcome::Cancelled { .. } => Err(TaskError::Canceled),
                        _ => Ok(()),
                    }
                }
            })
        };

        vec![
            TickSpec::with_defaults(discovery, schedule.discovery_interval(), cfg)
                .with_first_tick(FirstTick::Immediately),
            TickSpec::with_defaults(availability, schedule.availability_interval(), cfg),
            TickSpec::with_defaults(acquisition, schedule.acquisition_interval(), cfg)
                .with_timeout(None),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::scripted::{Call, ScriptedInventory};
    use crate::model::fixtures::candidate;
    use std::time::Duration;

    #[test]
    fn three_jobs_with_their_cadences() {
        let engine = Engine::new(
            Arc::new(ScriptedInventory::new()),
            TierFilter::default(),
            PacingPolicy::none(),
            Termination::new(),
        );
        let schedule = ScheduleSettings::default();
        let specs = engine.tick_specs(&schedule, &SchedulerConfig::default());

        let summary: Vec<(&str, u64, FirstTick)> = specs
            .iter()
            .map(|s| (s.name(), s.interval().as_secs(), s.first_tick()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DISCOVERY, 300, FirstTick::Immediately),
                (AVAILABILITY, 5, FirstTick::AfterInterval),
                (ACQUISITION, 1, FirstTick::AfterInterval),
            ]
        );
    }

    #[test]
    fn acquisition_is_exempt_from_the_tick_timeout() {
        let engine = Engine::new(
            Arc::new(ScriptedInventory::new()),
            TierFilter::default(),
            PacingPolicy::none(),
            Termination::new(),
        );
        let cfg = SchedulerConfig {
            tick_timeout: Duration::from_secs(2),
            ..SchedulerConfig::default()
        };
        let specs = engine.tick_specs(&ScheduleSettings::default(), &cfg);

        let timeouts: Vec<(&str, Option<Duration>)> =
            specs.iter().map(|s| (s.name(), s.timeout())).collect();
        assert_eq!(
            timeouts,
            vec![
                (DISCOVERY, Some(Duration::from_secs(2))),
                (AVAILABILITY, Some(Duration::from_secs(2))),
                (ACQUISITION, None),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_claim_outliving_the_tick_timeout_confirms_once() {
        let inventory = Arc::new(
            ScriptedInventory::new()
                .claimable("s1")
                .confirmable("s1")
                .with_claim_latency(Duration::from_secs(3)),
        );
        let engine = Engine::new(
            Arc::clone(&inventory) as InventoryRef,
            TierFilter::default(),
            PacingPolicy::none(),
            Termination::new(),
        );
        engine.cache().replace(vec![candidate(1, "W1", "s1")]).await;
        let cfg = SchedulerConfig {
            tick_timeout: Duration::from_secs(2),
            ..SchedulerConfig::default()
        };
        let acquisition: Vec<TickSpec> = engine
            .tick_specs(&ScheduleSettings::default(), &cfg)
            .into_iter()
            .filter(|s| s.name() == ACQUISITION)
            .collect();

        let outcome = crate::core::Scheduler::new(cfg, Vec::new(), engine.termination().clone())
            .run(acquisition)
            .await
            .unwrap();

        assert!(matches!(outcome, crate::core::RunOutcome::Reserved(r) if r.order_id.as_str() == "order-s1"));
        assert_eq!(inventory.count(|c| matches!(c, Call::Confirm(_))), 1);
        let again = engine.acquirer().attempt(&CancellationToken::new()).await;
        assert_eq!(again, AttemptOutcome::Skipped);
    }
}
