//! In-memory inventory with scripted answers, for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::Inventory;
use crate::error::InventoryError;
use crate::model::{AvailabilityWindow, Candidate, ClaimTicket, OrderId, Provider, SubSlot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Providers,
    Availability(u64),
    SubSlots(String),
    Claim(String),
    Confirm(String),
}

#[derive(Default)]
pub(crate) struct ScriptedInventory {
    providers: Option<Vec<Provider>>,
    windows: HashMap<u64, Vec<AvailabilityWindow>>,
    slots: HashMap<String, Vec<SubSlot>>,
    claimable: HashSet<String>,
    confirmable: HashSet<String>,
    latency: Duration,
    claim_latency: Duration,
    calls: Mutex<Vec<Call>>,
    availability_at: Mutex<Vec<Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider listing answer; never calling this makes the listing fail.
    pub fn with_providers(mut self, providers: Vec<Provider>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Windows of one provider; providers without windows fail their listing.
    pub fn with_windows(mut self, provider_id: u64, windows: Vec<AvailabilityWindow>) -> Self {
        self.windows.insert(provider_id, windows);
        self
    }

    /// Sub-slots of one window (by schedule id); unknown windows fail.
    pub fn with_slots(mut self, schedule_id: &str, slots: Vec<SubSlot>) -> Self {
        self.slots.insert(schedule_id.to_string(), slots);
        self
    }

    /// Slot ids whose claim yields a ticket.
    pub fn claimable(mut self, slot_id: &str) -> Self {
        self.claimable.insert(slot_id.to_string());
        self
    }

    /// Slot ids whose ticket also confirms.
    pub fn confirmable(mut self, slot_id: &str) -> Self {
        self.confirmable.insert(slot_id.to_string());
        self
    }

    /// Simulated round-trip time of availability queries.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulated round-trip time of claims; the call is recorded before the wait.
    pub fn with_claim_latency(mut self, latency: Duration) -> Self {
        self.claim_latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn availability_instants(&self) -> Vec<Instant> {
        self.availability_at.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failed(operation: &'static str) -> InventoryError {
        InventoryError::Rejected {
            operation,
            body: "scripted failure".into(),
        }
    }
}

#[async_trait]
impl Inventory for ScriptedInventory {
    async fn list_providers(&self) -> Result<Vec<Provider>, InventoryError> {
        self.record(Call::Providers);
        self.providers
            .clone()
            .ok_or_else(|| Self::failed("list_providers"))
    }

    async fn list_availability(
        &self,
        provider: &Provider,
    ) -> Result<Vec<AvailabilityWindow>, InventoryError> {
        self.record(Call::Availability(provider.id));
        self.availability_at.lock().unwrap().push(Instant::now());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.windows
            .get(&provider.id)
            .cloned()
            .ok_or_else(|| Self::failed("list_availability"))
    }

    async fn list_sub_slots(
        &self,
        _provider: &Provider,
        window: &AvailabilityWindow,
    ) -> Result<Vec<SubSlot>, InventoryError> {
        self.record(Call::SubSlots(window.schedule_id.clone()));
        self.slots
            .get(&window.schedule_id)
            .cloned()
            .ok_or_else(|| Self::failed("list_sub_slots"))
    }

    async fn claim(&self, candidate: &Candidate) -> Result<ClaimTicket, InventoryError> {
        let slot = candidate.slot.id.clone();
        self.record(Call::Claim(slot.clone()));
        if !self.claim_latency.is_zero() {
            tokio::time::sleep(self.claim_latency).await;
        }
        if self.claimable.contains(&slot) {
            Ok(ClaimTicket::new(slot))
        } else {
            Err(InventoryError::MissingTicket)
        }
    }

    async fn confirm(&self, ticket: &ClaimTicket) -> Result<OrderId, InventoryError> {
        let slot = ticket.as_str().to_string();
        self.record(Call::Confirm(slot.clone()));
        if self.confirmable.contains(&slot) {
            Ok(OrderId::new(format!("order-{slot}")))
        } else {
            Err(InventoryError::MissingOrderId {
                body: "sold out".into(),
            })
        }
    }
}
