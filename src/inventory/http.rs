//! HTTP implementation of the [`Inventory`] trait over `reqwest`.
//!
//! Authenticated endpoints carry the member's `JSESSIONID` cookie. The session
//! is read from a `watch` channel on every request, so a credentials reload takes
//! effect on the next round trip.
//!
//! Requests are built here and sent through a [`Transport`]; production uses
//! [`ReqwestTransport`], tests substitute a recording one.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::header::COOKIE;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use super::Inventory;
use super::payload::{
    ProvidersResponse, SlotsResponse, WindowsResponse, decode, extract_order_id, extract_ticket,
};
use crate::config::{Credentials, InventorySettings};
use crate::error::{ConfigError, InventoryError};
use crate::model::{AvailabilityWindow, Candidate, ClaimTicket, OrderId, Provider, SubSlot};

/// Browser-like User-Agent; the service rejects bare clients.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 MicroMessenger/8.0";

/// Status and body of a completed round trip.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends built requests. Status codes are not interpreted here.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::Request,
    ) -> Result<RawResponse, InventoryError>;
}

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::Request,
    ) -> Result<RawResponse, InventoryError> {
        let response = self.client.execute(request).await.map_err(|e| {
            warn!(
                operation,
                error = %e,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "inventory request failed"
            );
            InventoryError::Transport {
                operation,
                error: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| InventoryError::Transport {
                operation,
                error: format!("failed to read body: {e}"),
            })?;
        Ok(RawResponse { status, body })
    }
}

/// Inventory client talking to the booking web service.
#[derive(Clone)]
pub struct HttpInventory {
    client: reqwest::Client,
    transport: Arc<dyn Transport>,
    settings: InventorySettings,
    credentials: watch::Receiver<Credentials>,
}

impl HttpInventory {
    /// Builds the client with the configured request timeout.
    pub fn new(
        settings: InventorySettings,
        credentials: watch::Receiver<Credentials>,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        let transport = Arc::new(ReqwestTransport::new(client.clone()));

        Ok(Self::with_transport(client, transport, settings, credentials))
    }

    /// Uses `client` only to build requests; `transport` sends them.
    pub fn with_transport(
        client: reqwest::Client,
        transport: Arc<dyn Transport>,
        settings: InventorySettings,
        credentials: watch::Receiver<Credentials>,
    ) -> Self {
        Self {
            client,
            transport,
            settings,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn credentials(&self) -> Credentials {
        self.credentials.borrow().clone()
    }

    fn session_cookie(creds: &Credentials) -> String {
        format!("JSESSIONID={}", creds.session_id)
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn fetch(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, InventoryError> {
        let request = request.build().map_err(|e| InventoryError::Transport {
            operation,
            error: format!("failed to build request: {e}"),
        })?;
        trace!(operation, url = %request.url(), "inventory request starting");

        let response = self.transport.execute(operation, request).await?;
        debug!(operation, status = response.status, "inventory response received");
        if !(200..300).contains(&response.status) {
            return Err(InventoryError::Status {
                operation,
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

fn unix_micros() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default()
}

#[async_trait]
impl Inventory for HttpInventory {
    async fn list_providers(&self) -> Result<Vec<Provider>, InventoryError> {
        const OP: &str = "list_providers";
        let creds = self.credentials();
        let request = self
            .client
            .get(self.url("doc/getDocListByTime.do"))
            .query(&[
                ("depId", creds.dep_id.as_str()),
                ("unitId", self.settings.unit_id.as_str()),
            ]);

        let body = self.fetch(OP, request).await?;
        decode::<ProvidersResponse>(OP, &body)?.into_providers(&body)
    }

    async fn list_availability(
        &self,
        provider: &Provider,
    ) -> Result<Vec<AvailabilityWindow>, InventoryError> {
        const OP: &str = "list_availability";
        let creds = self.credentials();
        let dep_id = provider.group.to_string();
        let doctor_id = provider.id.to_string();
        let request = self
            .client
            .get(self.url("sch_new/schedulelist.do"))
            .header(COOKIE, Self::session_cookie(&creds))
            .query(&[
                ("unit_id", self.settings.unit_id.as_str()),
                ("dep_id", dep_id.as_str()),
                ("doctor_id", doctor_id.as_str()),
                ("cur_dep_id", dep_id.as_str()),
                ("unit_name", self.settings.unit_name.as_str()),
                ("dep_name", self.settings.dep_name.as_str()),
            ]);

        let body = self.fetch(OP, request).await?;
        decode::<WindowsResponse>(OP, &body)?.into_windows(provider, &body)
    }

    async fn list_sub_slots(
        &self,
        provider: &Provider,
        window: &AvailabilityWindow,
    ) -> Result<Vec<SubSlot>, InventoryError> {
        const OP: &str = "list_sub_slots";
        let creds = self.credentials();
        let detail_map = serde_json::json!([{
            "unit_id": self.settings.unit_id,
            "doctor_id": provider.id.to_string(),
            "dep_id": provider.group.to_string(),
            "schedule_id": window.schedule_id,
            "time_type": window.bucket,
        }])
        .to_string();
        let request = self
            .client
            .get(self.url("sch_new/detlnew.do"))
            .header(COOKIE, Self::session_cookie(&creds))
            .query(&[("unit_detl_map", detail_map.as_str())]);

        let body = self.fetch(OP, request).await?;
        decode::<SlotsResponse>(OP, &body)?.into_slots(&body)
    }

    async fn claim(&self, candidate: &Candidate) -> Result<ClaimTicket, InventoryError> {
        const OP: &str = "claim";
        let creds = self.credentials();
        let s = &self.settings;
        let params: Vec<(&str, String)> = vec![
            ("r", unix_micros().to_string()),
            ("unit_id", s.unit_id.clone()),
            ("branch_id", s.branch_id.clone()),
            ("dep_id", candidate.provider.group.to_string()),
            ("doc_id", candidate.provider.id.to_string()),
            ("sch_id", candidate.window.schedule_id.clone()),
            ("detl", candidate.slot.id.clone()),
            ("dep_name", s.dep_name.clone()),
            ("doc_name", candidate.provider.name.clone()),
            ("doc_level", candidate.provider.tier.clone()),
            ("amt", s.fee.clone()),
            ("sch_date", candidate.window.date.clone()),
            ("riseamt", s.rise_fee.clone()),
            ("begin_time", candidate.slot.begin.clone()),
            ("end_time", candidate.slot.end.clone()),
            ("origin_unit_id", s.unit_id.clone()),
            ("method", "sch1".to_string()),
            ("srcext_type", String::new()),
        ];
        let request = self
            .client
            .get(self.url("addOrder/main.do"))
            .header(COOKIE, Self::session_cookie(&creds))
            .query(&params);

        let body = self.fetch(OP, request).await?;
        extract_ticket(&String::from_utf8_lossy(&body))
    }

    async fn confirm(&self, ticket: &ClaimTicket) -> Result<OrderId, InventoryError> {
        const OP: &str = "confirm";
        let creds = self.credentials();
        let request = self
            .client
            .post(self.url("act/order/buildOrder.do"))
            .header(COOKIE, Self::session_cookie(&creds))
            .query(&[("r", ticket.as_str()), ("method", "sch1")])
            .form(&[
                ("branchId", self.settings.branch_id.as_str()),
                ("payway", self.settings.pay_way.as_str()),
                ("socialType", ""),
                ("mid", creds.member_id.as_str()),
                ("yuyueUserType", ""),
                ("memberType", ""),
            ]);

        let body = self.fetch(OP, request).await?;
        extract_order_id(&String::from_utf8_lossy(&body))
    }
}
