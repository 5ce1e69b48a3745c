//! # Acquisition executor: two-phase claim over the cached candidates.
//!
//! ```text
//! attempt(ctx):
//!   termination already signaled? ──► Skipped
//!   lock cache (held for the whole tick)
//!   for candidate in cache.rev():          // most recently expanded first
//!       ctx cancelled?    ──► Cancelled (stop)
//!       claim(candidate)  ── Err ──► next
//!       confirm(ticket)   ── Err ──► next
//!       signal(Reservation) ──► Reserved (stop)
//!   Exhausted
//! ```
//!
//! Every failure (transport, malformed page, business rejection) means only
//! "this candidate yielded nothing". The reverse order mirrors the insertion
//! order of the refresh; it is kept as observed and carries no priority meaning.
//!
//! Cancellation is only observed between candidates: a claim that was sent is
//! always followed through to its confirm, so a committed order is never lost.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::CandidateCache;
use super::termination::Termination;
use crate::inventory::InventoryRef;
use crate::model::Reservation;

/// Result of one acquisition tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// This tick confirmed a reservation and signaled termination.
    Reserved(Reservation),
    /// Every cached candidate was tried (possibly none) without success.
    Exhausted {
        /// Number of candidates a claim was sent for.
        attempted: usize,
    },
    /// Termination was already signaled; nothing was sent.
    Skipped,
    /// The tick was cancelled before every candidate was tried.
    Cancelled {
        attempted: usize,
    },
}

/// Runs the claim/confirm transaction against the cache contents.
pub struct Acquirer {
    inventory: InventoryRef,
    cache: Arc<CandidateCache>,
    termination: Termination,
}

impl Acquirer {
    pub fn new(inventory: InventoryRef, cache: Arc<CandidateCache>, termination: Termination) -> Self {
        Self {
            inventory,
            cache,
            termination,
        }
    }

    /// One acquisition tick; `ctx` stops it between candidates.
    pub async fn attempt(&self, ctx: &CancellationToken) -> AttemptOutcome {
        if self.termination.is_signaled() {
            return AttemptOutcome::Skipped;
        }

        let candidates = self.cache.lock().await;
        if candidates.is_empty() {
            debug!("no candidates to claim");
            return AttemptOutcome::Exhausted { attempted: 0 };
        }

        let mut attempted = 0;
        for candidate in candidates.iter().rev() {
            if self.termination.is_signaled() {
                return AttemptOutcome::Skipped;
            }
            if ctx.is_cancelled() {
                debug!(attempted, "acquisition cancelled");
                return AttemptOutcome::Cancelled { attempted };
            }
            attempted += 1;
            info!(%candidate, "submitting claim");

            let ticket = match self.inventory.claim(candidate).await {
                Ok(t) => t,
                Err(e) => {
                    warn!(%candidate, error = %e, label = e.as_label(), "claim failed");
                    continue;
                }
            };

            let order_id = match self.inventory.confirm(&ticket).await {
                Ok(id) => id,
                Err(e) => {
                    warn!(%candidate, error = %e, label = e.as_label(), "confirm failed");
                    continue;
                }
            };

            let reservation = Reservation {
                order_id,
                candidate: candidate.clone(),
            };
            info!(order_id = %reservation.order_id, %candidate, "reservation confirmed");
            return if self.termination.signal(reservation.clone()) {
                AttemptOutcome::Reserved(reservation)
            } else {
                AttemptOutcome::Skipped
            };
        }

        debug!(attempted, generation = candidates.generation(), "no candidate could be reserved");
        AttemptOutcome::Exhausted { attempted }
    }
}
