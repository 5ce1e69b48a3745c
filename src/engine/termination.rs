//! # One-shot success signal.
//!
//! [`Termination`] is a single-slot channel written at most once, by the
//! acquisition executor, when a reservation is confirmed. Writing it also
//! cancels its token; the scheduler derives its runtime token from that token,
//! so no tick is dispatched after the signal.
//!
//! ```text
//! Acquirer ── signal(reservation) ──► slot (first write wins)
//!                                     └─► token.cancel() ──► scheduler stops
//! ```

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::model::Reservation;

struct Inner {
    slot: OnceLock<Reservation>,
    token: CancellationToken,
}

/// Cloneable handle to the shared success signal.
#[derive(Clone)]
pub struct Termination {
    inner: Arc<Inner>,
}

impl Default for Termination {
    fn default() -> Self {
        Self::new()
    }
}

impl Termination {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: OnceLock::new(),
                token: CancellationToken::new(),
            }),
        }
    }

    /// Stores the reservation and cancels the token.
    ///
    /// Returns `false` (and drops `reservation`) if a reservation was already
    /// signaled.
    pub fn signal(&self, reservation: Reservation) -> bool {
        let first = self.inner.slot.set(reservation).is_ok();
        if first {
            self.inner.token.cancel();
        }
        first
    }

    pub fn is_signaled(&self) -> bool {
        self.inner.slot.get().is_some()
    }

    /// The signaled reservation, if any.
    pub fn reservation(&self) -> Option<&Reservation> {
        self.inner.slot.get()
    }

    /// Token cancelled exactly when the signal fires.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Waits for the signal and returns the reservation.
    pub async fn wait(&self) -> Option<Reservation> {
        self.inner.token.cancelled().await;
        self.inner.slot.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, fixtures};

    fn reservation(order: &str) -> Reservation {
        Reservation {
            order_id: OrderId::new(order),
            candidate: fixtures::candidate(1, "W1", "s1"),
        }
    }

    #[test]
    fn first_signal_wins() {
        let term = Termination::new();
        assert!(!term.is_signaled());
        assert!(term.signal(reservation("1")));
        assert!(!term.signal(reservation("2")));
        assert_eq!(term.reservation().unwrap().order_id.as_str(), "1");
        assert!(term.token().is_cancelled());
    }

    #[tokio::test]
    async fn waiters_receive_the_reservation() {
        let term = Termination::new();
        let waiter = {
            let term = term.clone();
            tokio::spawn(async move { term.wait().await })
        };
        term.signal(reservation("42"));
        let got = waiter.await.unwrap().unwrap();
        assert_eq!(got.order_id.as_str(), "42");
    }

    #[test]
    fn child_tokens_follow_the_signal() {
        let term = Termination::new();
        let runtime = term.token().child_token();
        term.signal(reservation("7"));
        assert!(runtime.is_cancelled());
    }
}
