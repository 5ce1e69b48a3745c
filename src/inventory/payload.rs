//! Wire payloads of the inventory service and their conversion to the model.
//!
//! JSON endpoints are decoded with `serde_json`; the claim and confirm
//! endpoints answer with HTML pages, from which the ticket and the order id are
//! extracted with anchored regular expressions.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::InventoryError;
use crate::model::{AvailabilityWindow, ClaimTicket, OrderId, Provider, SubSlot};

/// `y_state` value of a window that can still be booked.
const OPEN_STATE: &str = "1";
/// `status` value of a successful schedule/slot listing.
const STATUS_OK: &str = "1";
/// `code` value of a successful provider listing.
const CODE_OK: &str = "success";
/// Longest raw body excerpt carried inside an error.
const EXCERPT_LEN: usize = 256;

static TICKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"buildOrder\.do\?r=(\d+)").expect("static regex"));
static ORDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"order_id: '(\d+)'").expect("static regex"));

#[derive(Debug, Deserialize)]
pub(crate) struct ProvidersResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    data: ProvidersData,
}

#[derive(Debug, Default, Deserialize)]
struct ProvidersData {
    #[serde(default)]
    rows: Vec<ProviderRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRow {
    doctor_name: String,
    doctor_id: u64,
    dep_id: u64,
    #[serde(default)]
    zcid: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindowsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: WindowsData,
}

#[derive(Debug, Default, Deserialize)]
struct WindowsData {
    #[serde(default)]
    sch: Vec<WindowRow>,
}

#[derive(Debug, Deserialize)]
struct WindowRow {
    #[serde(default)]
    y_state: String,
    #[serde(default)]
    left_num: String,
    #[serde(default)]
    to_date: String,
    #[serde(default)]
    time_type: String,
    #[serde(default)]
    time_type_desc: String,
    schedule_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlotsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<SlotRow>,
}

#[derive(Debug, Deserialize)]
struct SlotRow {
    #[serde(default)]
    begin_time: String,
    #[serde(default)]
    end_time: String,
    #[serde(default)]
    detl_time_desc: String,
    #[serde(default)]
    yuyue_num: u32,
    detl_id: String,
}

/// Decodes a JSON body, mapping failures to [`InventoryError::Decode`].
pub(crate) fn decode<T: for<'de> Deserialize<'de>>(
    operation: &'static str,
    body: &[u8],
) -> Result<T, InventoryError> {
    serde_json::from_slice(body).map_err(|e| InventoryError::Decode {
        operation,
        error: format!("{e}; body: {}", excerpt(body)),
    })
}

impl ProvidersResponse {
    pub(crate) fn into_providers(self, raw: &[u8]) -> Result<Vec<Provider>, InventoryError> {
        if self.code != CODE_OK {
            return Err(rejected("list_providers", raw));
        }
        Ok(self
            .data
            .rows
            .into_iter()
            .map(|row| Provider {
                id: row.doctor_id,
                name: row.doctor_name,
                group: row.dep_id,
                tier: row.zcid,
            })
            .collect())
    }
}

impl WindowsResponse {
    pub(crate) fn into_windows(
        self,
        provider: &Provider,
        raw: &[u8],
    ) -> Result<Vec<AvailabilityWindow>, InventoryError> {
        if self.status != STATUS_OK {
            return Err(rejected("list_availability", raw));
        }
        Ok(self
            .data
            .sch
            .into_iter()
            .map(|row| AvailabilityWindow {
                provider_id: provider.id,
                open: row.y_state == OPEN_STATE,
                remaining: row.left_num.trim().parse().ok(),
                schedule_id: row.schedule_id,
                date: row.to_date,
                bucket: row.time_type,
                bucket_label: row.time_type_desc,
            })
            .collect())
    }
}

impl SlotsResponse {
    pub(crate) fn into_slots(self, raw: &[u8]) -> Result<Vec<SubSlot>, InventoryError> {
        if self.status != STATUS_OK {
            return Err(rejected("list_sub_slots", raw));
        }
        Ok(self
            .data
            .into_iter()
            .map(|row| SubSlot {
                id: row.detl_id,
                begin: row.begin_time,
                end: row.end_time,
                label: row.detl_time_desc,
                remaining: row.yuyue_num,
            })
            .collect())
    }
}

/// Extracts the transaction ticket from the claim page.
pub(crate) fn extract_ticket(page: &str) -> Result<ClaimTicket, InventoryError> {
    TICKET_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| ClaimTicket::new(m.as_str()))
        .ok_or(InventoryError::MissingTicket)
}

/// Extracts the order id from the confirm page.
pub(crate) fn extract_order_id(page: &str) -> Result<OrderId, InventoryError> {
    ORDER_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| OrderId::new(m.as_str()))
        .ok_or_else(|| InventoryError::MissingOrderId {
            body: excerpt(page.as_bytes()),
        })
}

fn rejected(operation: &'static str, raw: &[u8]) -> InventoryError {
    InventoryError::Rejected {
        operation,
        body: excerpt(raw),
    }
}

fn excerpt(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.into_owned(),
    }
}
