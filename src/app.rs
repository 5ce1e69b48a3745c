//! # Application wiring.
//!
//! [`App`] turns loaded [`Settings`] into a running scheduler:
//!
//! ```text
//! Settings ──► CredentialsReloader ──watch──► HttpInventory
//!               ▲         │                        │
//!   file watcher┘         ▼                        ▼
//!            "config-reload" job        Engine (discovery, availability,
//!            (optional poll)                    acquisition jobs)
//!                     └───────────┬─────────────┘
//!                                 ▼
//!                   Scheduler + LogWriter ──► RunOutcome
//! ```
//!
//! If the file watcher cannot start, the periodic reload job takes over
//! (every `reload_secs`, or [`FALLBACK_RELOAD`] when that is unset).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{CredentialsReloader, Settings};
use crate::core::{RunOutcome, SchedulerBuilder, SchedulerConfig};
use crate::engine::{Engine, Termination, TierFilter};
use crate::error::{ConfigError, RuntimeError, TaskError};
use crate::inventory::{HttpInventory, InventoryRef};
use crate::subscribers::LogWriter;
use crate::tasks::{TaskFn, TickSpec};

/// Name of the credentials reload job.
pub const CONFIG_RELOAD: &str = "config-reload";

/// Poll period used when the file watcher is unavailable and no poll is configured.
pub const FALLBACK_RELOAD: Duration = Duration::from_secs(30);

/// Everything needed for one run.
pub struct App {
    settings: Settings,
    inventory: InventoryRef,
    reloader: Option<Arc<CredentialsReloader>>,
}

impl App {
    /// Production wiring: HTTP inventory plus credentials hot reload from `config_path`.
    pub fn new(settings: Settings, config_path: PathBuf) -> Result<Self, ConfigError> {
        let (reloader, credentials) =
            CredentialsReloader::new(config_path, settings.credentials.clone());
        let inventory = HttpInventory::new(settings.inventory.clone(), credentials)?;
        Ok(Self {
            settings,
            inventory: Arc::new(inventory),
            reloader: Some(Arc::new(reloader)),
        })
    }

    /// Runs against any inventory, without hot reload.
    pub fn with_inventory(settings: Settings, inventory: InventoryRef) -> Self {
        Self {
            settings,
            inventory,
            reloader: None,
        }
    }

    /// Runs until a reservation is confirmed or the process is signaled.
    pub async fn run(self) -> Result<RunOutcome, RuntimeError> {
        let schedule = &self.settings.schedule;
        let termination = Termination::new();
        let engine = Engine::new(
            self.inventory,
            TierFilter::default(),
            schedule.pacing(),
            termination.clone(),
        );

        let cfg = SchedulerConfig::from(schedule);
        let mut specs = engine.tick_specs(schedule, &cfg);

        let watch_stop = CancellationToken::new();
        let mut watcher = None;
        if let Some(reloader) = self.reloader {
            let mut poll = schedule.reload_interval();
            if schedule.watch_config {
                match Arc::clone(&reloader).watch(watch_stop.clone()) {
                    Ok(handle) => watcher = Some(handle),
                    Err(e) => {
                        warn!(error = %e, label = e.as_label(), "file watch unavailable; polling instead");
                        poll = poll.or(Some(FALLBACK_RELOAD));
                    }
                }
            }
            match poll {
                Some(every) => specs.push(reload_spec(reloader, every, &cfg)),
                None if watcher.is_none() => debug!("credentials reload disabled"),
                None => {}
            }
        }

        info!(
            discovery = ?schedule.discovery_interval(),
            availability = ?schedule.availability_interval(),
            acquisition = ?schedule.acquisition_interval(),
            "scheduler starting"
        );
        let scheduler = SchedulerBuilder::new(cfg)
            .with_subscribers(vec![Arc::new(LogWriter::new())])
            .with_termination(termination)
            .build();
        let outcome = scheduler.run(specs).await;

        watch_stop.cancel();
        if let Some(handle) = watcher {
            let _ = handle.await;
        }
        outcome
    }
}

/// Periodic credentials reload; a failed reload fails only that tick.
fn reload_spec(reloader: Arc<CredentialsReloader>, every: Duration, cfg: &SchedulerConfig) -> TickSpec {
    let task = TaskFn::arc(CONFIG_RELOAD, move |_ctx: CancellationToken| {
        let reloader = Arc::clone(&reloader);
        async move {
            let worker = Arc::clone(&reloader);
            let changed = tokio::task::spawn_blocking(move || worker.reload())
                .await
                .map_err(|e| TaskError::Fail { error: e.to_string() })?
                .map_err(|e| TaskError::Fail { error: e.to_string() })?;
            if changed {
                info!(path = %reloader.path().display(), "credentials reloaded");
            }
            Ok(())
        }
    });
    TickSpec::with_defaults(task, every, cfg)
}
