//! # Refresh pipeline: providers → availability → sub-slots → cache.
//!
//! Two stages with different cadences:
//!
//! ```text
//! refresh_providers()            (discovery tick, slow)
//!   ├─ list_providers → TierFilter → known providers
//!   └─ refresh_availability_for(&providers)      ◄── cascade, never scheduled
//!
//! refresh_availability()         (availability tick, fast)
//!   └─ uses the last known providers
//!
//! both availability entries ──► rebuild():
//!   for provider in providers (sequential):
//!       list_availability ─► open windows ─► list_sub_slots ─► Candidate per slot
//!       pacing pause
//!   cache.replace(all candidates)
//! ```
//!
//! ## Rules
//! - A failed query drops only the item it was for (a provider, or a window);
//!   it is logged and the pipeline goes on.
//! - Rebuilds are serialized: the scheduled and cascaded refreshes never
//!   interleave, so there is exactly one cache writer at a time.
//! - Cancellation is checked between providers; a cancelled rebuild leaves the
//!   cache untouched.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::CandidateCache;
use super::eligibility::TierFilter;
use crate::inventory::InventoryRef;
use crate::model::{Candidate, Provider};
use crate::policies::PacingPolicy;

/// Result of one availability rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Cache generation written by this rebuild.
    pub generation: u64,
    /// Number of candidates now cached.
    pub candidates: usize,
}

/// Result of one discovery cycle, including its cascaded rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// Eligible providers found.
    pub providers: usize,
    /// `None` if the cascaded rebuild was cancelled.
    pub refresh: Option<RefreshOutcome>,
}

/// Builds candidate generations and writes them into the cache.
pub struct RefreshPipeline {
    inventory: InventoryRef,
    cache: Arc<CandidateCache>,
    filter: TierFilter,
    pacing: PacingPolicy,
    known: RwLock<Arc<[Provider]>>,
    writer: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(
        inventory: InventoryRef,
        cache: Arc<CandidateCache>,
        filter: TierFilter,
        pacing: PacingPolicy,
    ) -> Self {
        Self {
            inventory,
            cache,
            filter,
            pacing,
            known: RwLock::new(Arc::from(Vec::new())),
            writer: Mutex::new(()),
        }
    }

    /// Providers found by the last discovery cycle.
    pub async fn known_providers(&self) -> Arc<[Provider]> {
        Arc::clone(&*self.known.read().await)
    }

    /// Discovery tick: refreshes the provider roster, then cascades into an
    /// availability rebuild for exactly that roster.
    pub async fn refresh_providers(&self, ctx: &CancellationToken) -> DiscoveryOutcome {
        let providers = match self.inventory.list_providers().await {
            Ok(raw) => {
                info!(count = raw.len(), "providers listed");
                self.filter.apply(raw)
            }
            Err(e) => {
                warn!(error = %e, label = e.as_label(), "provider discovery failed");
                Vec::new()
            }
        };

        for p in &providers {
            info!(provider = p.short_name(), tier = %p.tier, "provider selected");
        }
        if providers.is_empty() {
            info!("no eligible providers");
        }

        let providers: Arc<[Provider]> = Arc::from(providers);
        *self.known.write().await = Arc::clone(&providers);

        let refresh = self.refresh_availability_for(&providers, ctx).await;
        DiscoveryOutcome {
            providers: providers.len(),
            refresh,
        }
    }

    /// Availability tick: rebuilds candidates for the last known providers.
    pub async fn refresh_availability(&self, ctx: &CancellationToken) -> Option<RefreshOutcome> {
        let providers = self.known_providers().await;
        self.rebuild(&providers, ctx).await
    }

    /// Cascade entry, invoked by discovery with the roster it just computed.
    pub async fn refresh_availability_for(
        &self,
        providers: &[Provider],
        ctx: &CancellationToken,
    ) -> Option<RefreshOutcome> {
        debug!(providers = providers.len(), "availability refresh cascaded from discovery");
        self.rebuild(providers, ctx).await
    }

    async fn rebuild(
        &self,
        providers: &[Provider],
        ctx: &CancellationToken,
    ) -> Option<RefreshOutcome> {
        let _writer = self.writer.lock().await;

        let mut candidates = Vec::new();
        for provider in providers {
            if ctx.is_cancelled() {
                return None;
            }
            self.expand_provider(provider, &mut candidates).await;
            if !self.pacing.wait(ctx).await {
                return None;
            }
        }

        if candidates.is_empty() {
            info!("no claimable candidates");
        }
        let count = candidates.len();
        let generation = self.cache.replace(candidates).await;
        debug!(generation, candidates = count, "candidate cache replaced");

        Some(RefreshOutcome {
            generation,
            candidates: count,
        })
    }

    async fn expand_provider(&self, provider: &Provider, out: &mut Vec<Candidate>) {
        let windows = match self.inventory.list_availability(provider).await {
            Ok(w) => w,
            Err(e) => {
                warn!(
                    provider = provider.short_name(),
                    error = %e,
                    label = e.as_label(),
                    "availability lookup failed"
                );
                return;
            }
        };

        for window in windows.iter().filter(|w| w.open) {
            info!(
                provider = provider.short_name(),
                tier = %provider.tier,
                date = %window.date,
                bucket = %window.bucket_label,
                remaining = ?window.remaining,
                "open window"
            );

            let slots = match self.inventory.list_sub_slots(provider, window).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(
                        provider = provider.short_name(),
                        schedule = %window.schedule_id,
                        error = %e,
                        label = e.as_label(),
                        "sub-slot lookup failed"
                    );
                    continue;
                }
            };

            for slot in slots {
                debug!(slot = %slot.label, remaining = slot.remaining, "sub-slot");
                out.push(Candidate::new(provider, window, slot));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::scripted::{Call, ScriptedInventory};
    use crate::model::fixtures::{provider, slot, window};
    use crate::policies::JitterPolicy;
    use std::time::Duration;

    fn pipeline(inv: Arc<ScriptedInventory>, pacing: PacingPolicy) -> (RefreshPipeline, Arc<CandidateCache>) {
        let cache = Arc::new(CandidateCache::new());
        let p = RefreshPipeline::new(inv, Arc::clone(&cache), TierFilter::new(["A", "B"]), pacing);
        (p, cache)
    }

    fn slot_ids(cache: &[Candidate]) -> Vec<&str> {
        cache.iter().map(|c| c.slot.id.as_str()).collect()
    }

    #[tokio::test]
    async fn discovery_filters_and_expands_open_windows() {
        let inv = Arc::new(
            ScriptedInventory::new()
                .with_providers(vec![provider(1, "A"), provider(2, "X")])
                .with_windows(1, vec![window(1, "W1", true), window(1, "W2", false)])
                .with_slots("W1", vec![slot("s1"), slot("s2")])
                .with_slots("W2", vec![slot("never")]),
        );
        let (p, cache) = pipeline(Arc::clone(&inv), PacingPolicy::none());

        let outcome = p.refresh_providers(&CancellationToken::new()).await;
        assert_eq!(outcome.providers, 1);
        assert_eq!(outcome.refresh.unwrap().candidates, 2);

        let snap = cache.snapshot().await;
        assert_eq!(slot_ids(&snap), vec!["s1", "s2"]);
        assert!(snap.iter().all(|c| c.window.open && c.provider.id == 1));
        assert_eq!(inv.count(|c| matches!(c, Call::Availability(2))), 0);
        assert_eq!(inv.count(|c| matches!(c, Call::SubSlots(s) if s == "W2")), 0);
    }

    #[tokio::test]
    async fn discovery_cascades_exactly_once_even_when_empty() {
        let inv = Arc::new(ScriptedInventory::new().with_providers(vec![provider(9, "X")]));
        let (p, cache) = pipeline(inv, PacingPolicy::none());
        cache.replace(vec![crate::model::fixtures::candidate(5, "old", "stale")]).await;

        let outcome = p.refresh_providers(&CancellationToken::new()).await;
        assert_eq!(outcome.providers, 0);
        assert_eq!(outcome.refresh.unwrap().generation, 2);
        assert_eq!(cache.generation().await, 2);
        assert!(cache.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn discovery_failure_yields_empty_roster() {
        let inv = Arc::new(ScriptedInventory::new());
        let (p, cache) = pipeline(inv, PacingPolicy::none());

        let outcome = p.refresh_providers(&CancellationToken::new()).await;
        assert_eq!(outcome.providers, 0);
        assert!(p.known_providers().await.is_empty());
        assert_eq!(cache.generation().await, 1);
    }

    #[tokio::test]
    async fn scheduled_refresh_uses_last_known_roster() {
        let inv = Arc::new(
            ScriptedInventory::new()
                .with_providers(vec![provider(1, "A"), provider(3, "B")])
                .with_windows(1, vec![window(1, "W1", true)])
                .with_windows(3, vec![window(3, "W3", true)])
                .with_slots("W1", vec![slot("a")])
                .with_slots("W3", vec![slot("b")]),
        );
        let (p, cache) = pipeline(Arc::clone(&inv), PacingPolicy::none());
        let ctx = CancellationToken::new();

        p.refresh_providers(&ctx).await;
        let outcome = p.refresh_availability(&ctx).await.unwrap();
        assert_eq!(outcome.generation, 2);
        assert_eq!(slot_ids(&cache.snapshot().await), vec!["a", "b"]);
        assert_eq!(inv.count(|c| matches!(c, Call::Providers)), 1);
        assert_eq!(inv.count(|c| matches!(c, Call::Availability(_))), 4);
    }

    #[tokio::test]
    async fn failing_provider_contributes_nothing() {
        let inv = Arc::new(
            ScriptedInventory::new()
                .with_providers(vec![provider(1, "A"), provider(2, "A"), provider(3, "A")])
                .with_windows(1, vec![window(1, "W1", true)])
                .with_windows(3, vec![window(3, "W3", true), window(3, "W4", true)])
                .with_slots("W1", vec![slot("one")])
                .with_slots("W3", vec![slot("three")]),
        );
        let (p, cache) = pipeline(Arc::clone(&inv), PacingPolicy::none());

        p.refresh_providers(&CancellationToken::new()).await;
        assert_eq!(slot_ids(&cache.snapshot().await), vec!["one", "three"]);
        assert_eq!(inv.count(|c| matches!(c, Call::SubSlots(s) if s == "W4")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn availability_queries_are_sequential_and_paced() {
        let pause = Duration::from_millis(200);
        let ids: Vec<u64> = (1..=4).collect();
        let mut inv = ScriptedInventory::new()
            .with_providers(ids.iter().map(|id| provider(*id, "A")).collect())
            .with_latency(Duration::from_millis(30));
        for id in &ids {
            inv = inv.with_windows(*id, Vec::new());
        }
        let inv = Arc::new(inv);
        let (p, _cache) = pipeline(
            Arc::clone(&inv),
            PacingPolicy {
                pause,
                jitter: JitterPolicy::Equal,
            },
        );

        p.refresh_providers(&CancellationToken::new()).await;

        let at = inv.availability_instants();
        assert_eq!(at.len(), 4);
        assert_eq!(inv.max_in_flight(), 1);
        for pair in at.windows(2) {
            assert!(pair[1] - pair[0] >= pause);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_rebuild_keeps_previous_generation() {
        let inv = Arc::new(
            ScriptedInventory::new()
                .with_providers(vec![provider(1, "A"), provider(2, "A")])
                .with_windows(1, vec![window(1, "W1", true)])
                .with_windows(2, Vec::new())
                .with_slots("W1", vec![slot("s1")]),
        );
        let (p, cache) = pipeline(
            inv,
            PacingPolicy {
                pause: Duration::from_secs(60),
                jitter: JitterPolicy::None,
            },
        );
        let ctx = CancellationToken::new();
        let canceller = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                ctx.cancel();
            })
        };

        let outcome = p.refresh_providers(&ctx).await;
        canceller.await.unwrap();
        assert_eq!(outcome.providers, 2);
        assert!(outcome.refresh.is_none());
        assert_eq!(cache.generation().await, 0);
    }
}
