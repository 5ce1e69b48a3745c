//! # Inventory client: the engine's only window onto the external system.
//!
//! The engine talks to the inventory through the [`Inventory`] trait. Every
//! operation is a single blocking round trip from the caller's point of view and
//! keeps no state between calls.
//!
//! ```text
//! list_providers() ─► list_availability(p) ─► list_sub_slots(p, w)   (refresh)
//! claim(candidate) ─► confirm(ticket)                                (acquisition)
//! ```
//!
//! - [`HttpInventory`]: the production implementation over `reqwest`, sending
//!   through a [`Transport`].

mod http;
mod payload;

#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::error::InventoryError;
use crate::model::{AvailabilityWindow, Candidate, ClaimTicket, OrderId, Provider, SubSlot};

pub use http::{HttpInventory, RawResponse, ReqwestTransport, Transport};

/// Shared handle to an inventory implementation.
pub type InventoryRef = std::sync::Arc<dyn Inventory>;

/// Request/response operations against the external inventory.
///
/// Failures are reported for logging only; callers treat every error as
/// "this item contributed nothing".
#[async_trait]
pub trait Inventory: Send + Sync + 'static {
    /// Lists every provider of the configured group, unfiltered.
    async fn list_providers(&self) -> Result<Vec<Provider>, InventoryError>;

    /// Lists the availability windows of one provider, open or not.
    async fn list_availability(
        &self,
        provider: &Provider,
    ) -> Result<Vec<AvailabilityWindow>, InventoryError>;

    /// Expands one window into its precise sub-slots.
    async fn list_sub_slots(
        &self,
        provider: &Provider,
        window: &AvailabilityWindow,
    ) -> Result<Vec<SubSlot>, InventoryError>;

    /// First phase: ask for the candidate and receive a transaction ticket.
    async fn claim(&self, candidate: &Candidate) -> Result<ClaimTicket, InventoryError>;

    /// Second phase: commit the ticket and receive the final order id.
    async fn confirm(&self, ticket: &ClaimTicket) -> Result<OrderId, InventoryError>;
}
