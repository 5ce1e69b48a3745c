//! # Application settings.
//!
//! Settings are read once at startup from a file (any format the `config` crate
//! recognizes by extension, `config.yaml` by default) layered with environment
//! variables: the `SLOTVISOR_` prefix, then `__` between nested keys
//! (`SLOTVISOR_CREDENTIALS__SESSION_ID=...`).
//!
//! ## Sections
//! - `credentials`: identity of the member on whose behalf slots are claimed.
//! - `inventory`: endpoint and request constants of the inventory service.
//! - `schedule`: tick intervals, request pacing, shutdown grace.
//!
//! ## Hot reload
//! [`CredentialsReloader`] re-reads the same sources and pushes changed
//! credentials through a `tokio::sync::watch` channel. The HTTP inventory reads
//! the latest value per request; other sections are fixed for the whole run.
//! Reloads are driven by a file watcher ([`ConfigWatcher`]) and optionally by
//! a periodic poll.

mod watcher;

pub use watcher::ConfigWatcher;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;

use crate::error::ConfigError;
use crate::policies::{JitterPolicy, PacingPolicy};

/// Environment variable prefix layered over the file source.
pub const ENV_PREFIX: &str = "SLOTVISOR";

/// Top-level settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub credentials: Credentials,
    #[serde(default)]
    pub inventory: InventorySettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

/// Identity and session of the member.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    /// Department whose providers are tracked.
    pub dep_id: String,
    /// Member the reservation is made for.
    pub member_id: String,
    /// Session cookie value (`JSESSIONID`).
    pub session_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("dep_id", &self.dep_id)
            .field("member_id", &self.member_id)
            .field("session_id", &"<redacted>")
            .finish()
    }
}

/// Endpoint and fixed request parameters of the inventory service.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    pub base_url: String,
    pub unit_id: String,
    pub branch_id: String,
    pub unit_name: String,
    pub dep_name: String,
    /// Registration fee sent with the claim request.
    pub fee: String,
    /// Surcharge sent with the claim request.
    pub rise_fee: String,
    pub pay_way: String,
    pub request_timeout_secs: u64,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            base_url: "https://wxis.91160.com/wxis".to_string(),
            unit_id: "21".to_string(),
            branch_id: "21".to_string(),
            unit_name: "北京大学深圳医院".to_string(),
            dep_name: "牙槽外科（拔牙）".to_string(),
            fee: "33.0".to_string(),
            rise_fee: "37.95".to_string(),
            pay_way: "14".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl InventorySettings {
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Tick cadence and pacing.
///
/// ## Sentinel values
/// - `tick_timeout_secs = 0` → ticks run without a timeout
/// - `reload_secs = 0` → no periodic reload (the file watcher still runs
///   when `watch_config` is set)
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Provider discovery cadence.
    pub discovery_secs: u64,
    /// Scheduled availability refresh cadence.
    pub availability_secs: u64,
    /// Acquisition attempt cadence.
    pub acquisition_secs: u64,
    /// Minimum pause after each provider's availability queries.
    pub request_pause_ms: u64,
    /// Extra randomized pause on top of `request_pause_ms`.
    pub request_jitter: JitterPolicy,
    pub grace_secs: u64,
    pub tick_timeout_secs: u64,
    pub reload_secs: u64,
    /// Reload credentials as soon as the settings file changes.
    pub watch_config: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            discovery_secs: 300,
            availability_secs: 5,
            acquisition_secs: 1,
            request_pause_ms: 200,
            request_jitter: JitterPolicy::None,
            grace_secs: 10,
            tick_timeout_secs: 0,
            reload_secs: 0,
            watch_config: true,
        }
    }
}

impl ScheduleSettings {
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_secs)
    }

    pub fn availability_interval(&self) -> Duration {
        Duration::from_secs(self.availability_secs)
    }

    pub fn acquisition_interval(&self) -> Duration {
        Duration::from_secs(self.acquisition_secs)
    }

    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy {
            pause: Duration::from_millis(self.request_pause_ms),
            jitter: self.request_jitter,
        }
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// `None` when ticks are unbounded.
    pub fn tick_timeout(&self) -> Option<Duration> {
        match self.tick_timeout_secs {
            0 => None,
            n => Some(Duration::from_secs(n)),
        }
    }

    /// `None` when reload is disabled.
    pub fn reload_interval(&self) -> Option<Duration> {
        match self.reload_secs {
            0 => None,
            n => Some(Duration::from_secs(n)),
        }
    }
}

impl Settings {
    /// Loads and validates settings from `path` plus the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &Path, env: config::Environment) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.credentials;
        for (field, value) in [
            ("credentials.user_id", &c.user_id),
            ("credentials.member_id", &c.member_id),
            ("credentials.session_id", &c.session_id),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        if c.dep_id.trim().parse::<u64>().is_err() {
            return Err(invalid("credentials.dep_id", "must be a number"));
        }

        let s = &self.schedule;
        for (field, value) in [
            ("schedule.discovery_secs", s.discovery_secs),
            ("schedule.availability_secs", s.availability_secs),
            ("schedule.acquisition_secs", s.acquisition_secs),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        if self.inventory.base_url.trim().is_empty() {
            return Err(invalid("inventory.base_url", "must not be empty"));
        }
        if self.inventory.request_timeout_secs == 0 {
            return Err(invalid("inventory.request_timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }
}

/// `SLOTVISOR_SECTION__KEY` environment source.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Re-reads the settings sources and publishes changed credentials.
pub struct CredentialsReloader {
    path: PathBuf,
    tx: watch::Sender<Credentials>,
}

impl CredentialsReloader {
    /// Creates the reloader and the receiver side handed to the inventory.
    pub fn new(path: PathBuf, initial: Credentials) -> (Self, watch::Receiver<Credentials>) {
        let (tx, rx) = watch::channel(initial);
        (Self { path, tx }, rx)
    }

    /// Reloads once. Returns `true` when the credentials changed.
    ///
    /// Only the credentials section is applied; other sections keep their
    /// startup values.
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let fresh = Settings::load(&self.path)?.credentials;
        Ok(self.tx.send_if_modified(|current| {
            if *current == fresh {
                false
            } else {
                *current = fresh;
                true
            }
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
