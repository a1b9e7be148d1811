//! Periodic refresh of the station directory.
//!
//! The directory drives station pickers, so a failed refresh keeps the
//! previous list instead of blanking it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::events::{DirectoryEvent, EventEmitter};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::station::directory::StationDirectory;
use crate::station::traits::StationDirectorySource;
use crate::utils::now_millis;

/// Refreshes the station directory on a fixed cadence.
pub struct DirectoryMonitor {
    api: Arc<dyn StationDirectorySource>,
    directory: Arc<StationDirectory>,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    refresh_interval: Duration,
    refresh_notify: Arc<Notify>,
    cancel_token: CancellationToken,
}

impl DirectoryMonitor {
    pub fn new(
        api: Arc<dyn StationDirectorySource>,
        directory: Arc<StationDirectory>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            api,
            directory,
            emitter,
            spawner,
            refresh_interval,
            refresh_notify: Arc::new(Notify::new()),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Requests an immediate refresh outside the regular schedule.
    pub fn refresh_now(&self) {
        self.refresh_notify.notify_one();
    }

    /// Stops the background refresh loop.
    pub fn stop(&self) {
        self.cancel_token.cancel();
        log::info!("[DirectoryMonitor] Stopped");
    }

    /// Starts the background refresh loop. The first refresh runs
    /// immediately.
    pub fn start_monitoring(self: Arc<Self>) {
        let monitor = self.clone();
        self.spawner.spawn(async move {
            let mut interval = tokio::time::interval(monitor.refresh_interval);
            loop {
                let is_manual = tokio::select! {
                    biased;
                    _ = monitor.cancel_token.cancelled() => break,
                    _ = interval.tick() => false,
                    _ = monitor.refresh_notify.notified() => true,
                };
                if is_manual {
                    interval.reset();
                }
                tokio::select! {
                    biased;
                    _ = monitor.cancel_token.cancelled() => break,
                    _ = monitor.refresh_directory() => {}
                }
            }
            log::debug!("[DirectoryMonitor] Refresh loop exited");
        });
    }

    async fn refresh_directory(&self) {
        match self.api.fetch_stations().await {
            Ok(stations) => {
                self.directory.replace_all(stations);
                log::info!(
                    "[DirectoryMonitor] Directory updated: {} stations",
                    self.directory.len()
                );
                self.emitter.emit_directory(DirectoryEvent::Updated {
                    stations: self.directory.all(),
                    timestamp: now_millis(),
                });
            }
            Err(err) => {
                log::warn!("[DirectoryMonitor] Directory refresh failed: {}", err);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
