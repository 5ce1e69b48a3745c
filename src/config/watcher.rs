//! # Settings file watcher.
//!
//! ```text
//! notify (own thread) ──► relevant event? ──► mpsc ──► ConfigWatcher::changed()
//!                                                           │ debounce, fold burst
//!                                                           ▼
//!                                           CredentialsReloader::reload()
//! ```
//!
//! The parent directory is watched, not the file itself: editors and secret
//! managers often replace the file with a rename, which a watch on the old
//! inode would never see.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::CredentialsReloader;
use crate::error::ConfigError;

/// Quiet period after the first change before the file is re-read.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Reports changes to one settings file.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<()>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        let file_name: OsString = path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| ConfigError::Watch(format!("{} names no file", path.display())))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if touches(&event, &file_name) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => warn!(error = %e, "configuration watch error"),
            },
            Config::default(),
        )
        .map_err(|e| ConfigError::Watch(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Watch(format!("{}: {e}", dir.display())))?;
        debug!(dir = %dir.display(), "watching configuration directory");

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Waits for the next change, folding a burst of events into one.
    ///
    /// Returns `None` once the underlying watcher has stopped.
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await?;
        tokio::time::sleep(DEBOUNCE).await;
        while self.rx.try_recv().is_ok() {}
        Some(())
    }
}

/// Creations and modifications (renames included) of the watched file.
/// Access events are ignored: reloading reads the file.
fn touches(event: &Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

impl CredentialsReloader {
    /// Reloads credentials on every change of the settings file until `stop`.
    ///
    /// A reload that fails (for example a half-written file) is logged and the
    /// current credentials stay in effect; the next change retries.
    pub fn watch(self: Arc<Self>, stop: CancellationToken) -> Result<JoinHandle<()>, ConfigError> {
        let mut watcher = ConfigWatcher::new(self.path())?;
        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    changed = watcher.changed() => {
                        if changed.is_none() {
                            warn!("configuration watcher stopped");
                            break;
                        }
                        let worker = Arc::clone(&self);
                        match tokio::task::spawn_blocking(move || worker.reload()).await {
                            Ok(Ok(true)) => info!(path = %self.path().display(), "credentials reloaded"),
                            Ok(Ok(false)) => debug!("configuration changed; credentials unchanged"),
                            Ok(Err(e)) => warn!(
                                error = %e,
                                label = e.as_label(),
                                "configuration reload failed; keeping current credentials"
                            ),
                            Err(e) => warn!(error = %e, "configuration reload task failed"),
                        }
                    }
                }
            }
        }))
    }
}
