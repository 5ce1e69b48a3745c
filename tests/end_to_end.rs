use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use slotvisor::{
    App, AttemptOutcome, AvailabilityWindow, Candidate, ClaimTicket, Credentials, Engine,
    Inventory, InventoryError, InventorySettings, JitterPolicy, OrderId, PacingPolicy, Provider,
    RunOutcome, ScheduleSettings, Settings, SubSlot, Termination, TierFilter,
};

/// Inventory answering the fixed scenario: one eligible provider, one open
/// window with two slots, the later slot refusing claims.
struct ClinicInventory {
    providers: Vec<Provider>,
    windows: HashMap<u64, Vec<AvailabilityWindow>>,
    slots: HashMap<String, Vec<SubSlot>>,
    log: Mutex<Vec<String>>,
}

impl ClinicInventory {
    fn new(eligible_tier: &str, other_tier: &str) -> Self {
        let provider = |id: u64, tier: &str| Provider {
            id,
            name: format!("doctor{id}-clinic"),
            group: 200,
            tier: tier.to_string(),
        };
        let window = |schedule_id: &str, open: bool| AvailabilityWindow {
            provider_id: 1,
            schedule_id: schedule_id.to_string(),
            date: "2026-10-21".to_string(),
            bucket: "am".to_string(),
            bucket_label: "morning".to_string(),
            remaining: Some(if open { 2 } else { 0 }),
            open,
        };
        let slot = |id: &str, begin: &str, end: &str| SubSlot {
            id: id.to_string(),
            begin: begin.to_string(),
            end: end.to_string(),
            label: format!("{begin}-{end}"),
            remaining: 1,
        };

        Self {
            providers: vec![provider(1, eligible_tier), provider(2, other_tier)],
            windows: HashMap::from([(1, vec![window("W1", true), window("W2", false)])]),
            slots: HashMap::from([(
                "W1".to_string(),
                vec![slot("s1", "08:00", "08:30"), slot("s2", "08:30", "09:00")],
            )]),
            log: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Inventory for ClinicInventory {
    async fn list_providers(&self) -> Result<Vec<Provider>, InventoryError> {
        self.record("providers".into());
        Ok(self.providers.clone())
    }

    async fn list_availability(
        &self,
        provider: &Provider,
    ) -> Result<Vec<AvailabilityWindow>, InventoryError> {
        self.record(format!("availability {}", provider.id));
        self.windows
            .get(&provider.id)
            .cloned()
            .ok_or(InventoryError::Status {
                operation: "list_availability",
                status: 404,
            })
    }

    async fn list_sub_slots(
        &self,
        _provider: &Provider,
        window: &AvailabilityWindow,
    ) -> Result<Vec<SubSlot>, InventoryError> {
        self.record(format!("sub_slots {}", window.schedule_id));
        Ok(self.slots.get(&window.schedule_id).cloned().unwrap_or_default())
    }

    async fn claim(&self, candidate: &Candidate) -> Result<ClaimTicket, InventoryError> {
        self.record(format!("claim {}", candidate.slot.id));
        if candidate.slot.id == "s2" {
            return Err(InventoryError::Rejected {
                operation: "claim",
                body: "slot taken".into(),
            });
        }
        Ok(ClaimTicket::new(format!("t-{}", candidate.slot.id)))
    }

    async fn confirm(&self, ticket: &ClaimTicket) -> Result<OrderId, InventoryError> {
        self.record(format!("confirm {}", ticket.as_str()));
        Ok(OrderId::new("ORD-1"))
    }
}

#[tokio::test]
async fn refresh_then_acquire_reserves_the_first_claimable_slot() {
    let inventory = Arc::new(ClinicInventory::new("A", "X"));
    let termination = Termination::new();
    let engine = Engine::new(
        inventory.clone(),
        TierFilter::new(["A", "B"]),
        PacingPolicy::none(),
        termination.clone(),
    );

    let discovery = engine
        .pipeline()
        .refresh_providers(&CancellationToken::new())
        .await;
    assert_eq!(discovery.providers, 1);
    assert_eq!(discovery.refresh.map(|r| r.candidates), Some(2));

    let cached: Vec<String> = engine
        .cache()
        .snapshot()
        .await
        .iter()
        .map(|c| format!("{}/{}/{}", c.provider.id, c.window.schedule_id, c.slot.id))
        .collect();
    assert_eq!(cached, vec!["1/W1/s1", "1/W1/s2"]);

    let AttemptOutcome::Reserved(reservation) = engine.acquirer().attempt(&CancellationToken::new()).await else {
        panic!("expected a reservation");
    };
    assert_eq!(reservation.order_id.as_str(), "ORD-1");
    assert_eq!(reservation.candidate.slot.id, "s1");
    assert_eq!(termination.reservation(), Some(&reservation));

    assert_eq!(
        inventory.log(),
        vec![
            "providers",
            "availability 1",
            "sub_slots W1",
            "claim s2",
            "claim s1",
            "confirm t-s1",
        ]
    );

    assert_eq!(engine.acquirer().attempt(&CancellationToken::new()).await, AttemptOutcome::Skipped);
    assert_eq!(inventory.log().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn scheduled_run_stops_on_the_reservation() {
    let inventory = Arc::new(ClinicInventory::new("主任医师", "主治医师"));
    let settings = Settings {
        credentials: Credentials {
            user_id: "u1".into(),
            dep_id: "200".into(),
            member_id: "m1".into(),
            session_id: "session".into(),
        },
        inventory: InventorySettings::default(),
        schedule: ScheduleSettings {
            request_pause_ms: 50,
            request_jitter: JitterPolicy::None,
            grace_secs: 1,
            reload_secs: 0,
            ..ScheduleSettings::default()
        },
    };

    let started = tokio::time::Instant::now();
    let outcome = App::with_inventory(settings, inventory.clone())
        .run()
        .await
        .unwrap();

    let RunOutcome::Reserved(reservation) = outcome else {
        panic!("expected a reservation, got {outcome:?}");
    };
    assert_eq!(reservation.order_id.as_str(), "ORD-1");
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(5));

    let log = inventory.log();
    assert_eq!(log.iter().filter(|e| e.starts_with("confirm")).count(), 1);
    assert_eq!(log.last().map(String::as_str), Some("confirm t-s1"));
}
