//! # Inventory data model.
//!
//! Plain values produced by the inventory and consumed by the engine:
//!
//! ```text
//! Provider ──► AvailabilityWindow (open?) ──► SubSlot
//!     └──────────────┴──────────────────────────┴──► Candidate (claimable unit)
//!
//! Candidate ──claim──► ClaimTicket ──confirm──► OrderId ──► Reservation
//! ```
//!
//! Everything here is immutable once built. A refresh cycle builds fresh values
//! and the previous generation is simply dropped.

use std::fmt;

/// An entity offering bookable time windows (e.g. a staffed doctor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provider {
    /// Inventory identifier.
    pub id: u64,
    /// Display name as returned by the inventory.
    pub name: String,
    /// Grouping key (department).
    pub group: u64,
    /// Tier label used by the eligibility filter.
    pub tier: String,
}

impl Provider {
    /// Display name without the inventory's `-suffix` decoration.
    pub fn short_name(&self) -> &str {
        self.name.split('-').next().unwrap_or(&self.name)
    }
}

/// A coarse open/closed period for a provider on a given date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailabilityWindow {
    /// Owning provider.
    pub provider_id: u64,
    /// Inventory schedule identifier.
    pub schedule_id: String,
    /// Calendar date as reported by the inventory.
    pub date: String,
    /// Time bucket code (morning/afternoon/...).
    pub bucket: String,
    /// Human-readable bucket label.
    pub bucket_label: String,
    /// Remaining-count hint. Advisory only.
    pub remaining: Option<u32>,
    /// Only open windows are expanded into sub-slots.
    pub open: bool,
}

/// A precise, individually claimable slot inside a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubSlot {
    /// Inventory sub-slot identifier.
    pub id: String,
    /// Begin time as reported by the inventory.
    pub begin: String,
    /// End time as reported by the inventory.
    pub end: String,
    /// Human-readable label.
    pub label: String,
    /// Remaining-count hint. Advisory only.
    pub remaining: u32,
}

/// The fully-qualified unit of acquisition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub provider: Provider,
    pub window: AvailabilityWindow,
    pub slot: SubSlot,
}

impl Candidate {
    pub fn new(provider: &Provider, window: &AvailabilityWindow, slot: SubSlot) -> Self {
        Self {
            provider: provider.clone(),
            window: window.clone(),
            slot,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {} {} {}-{}",
            self.provider.short_name(),
            self.provider.tier,
            self.window.date,
            self.window.bucket_label,
            self.slot.begin,
            self.slot.end,
        )
    }
}

/// Opaque transaction token returned by a successful claim.
///
/// Consumed by the confirm phase right away; never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimTicket(String);

impl ClaimTicket {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Final order identifier returned by a successful confirm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A confirmed reservation: the order id and the candidate it was made for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub order_id: OrderId,
    pub candidate: Candidate,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn provider(id: u64, tier: &str) -> Provider {
        Provider {
            id,
            name: format!("doctor{id}-clinic"),
            group: 100,
            tier: tier.to_string(),
        }
    }

    pub fn window(provider_id: u64, schedule_id: &str, open: bool) -> AvailabilityWindow {
        AvailabilityWindow {
            provider_id,
            schedule_id: schedule_id.to_string(),
            date: "2026-10-20".to_string(),
            bucket: "1".to_string(),
            bucket_label: "morning".to_string(),
            remaining: Some(3),
            open,
        }
    }

    pub fn slot(id: &str) -> SubSlot {
        SubSlot {
            id: id.to_string(),
            begin: "08:00".to_string(),
            end: "08:30".to_string(),
            label: "08:00-08:30".to_string(),
            remaining: 1,
        }
    }

    pub fn candidate(provider_id: u64, schedule_id: &str, slot_id: &str) -> Candidate {
        Candidate::new(
            &provider(provider_id, "A"),
            &window(provider_id, schedule_id, true),
            slot(slot_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn short_name_strips_suffix() {
        let p = provider(7, "A");
        assert_eq!(p.short_name(), "doctor7");
    }

    #[test]
    fn candidate_display_is_human_readable() {
        let c = candidate(7, "W1", "s1");
        assert_eq!(c.to_string(), "doctor7(A) 2026-10-20 morning 08:00-08:30");
    }
}
