//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together. This pattern provides:
//!
//! - **Clarity**: All dependency relationships are visible in one place
//! - **Testability**: Easy to swap implementations for testing
//! - **Maintainability**: Service creation logic is isolated from usage

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::auth::{StaticTokenSource, TokenManager};
use crate::context::ApiContext;
use crate::error::{MixplaError, MixplaResult};
use crate::events::{BroadcastEvent, BroadcastEventBridge, EventEmitter};
use crate::player::{NullEngine, PlaybackCoordinator, PlaybackEngine, SegmentStats};
use crate::runtime::TokioSpawner;
use crate::services::{DirectoryMonitor, StatusMonitor};
use crate::state::Config;
use crate::station::directory::StationDirectory;
use crate::station::store::StationStore;
use crate::station::traits::{RadioClient, StationControl, StationDirectorySource};
use crate::station::types::StationPhase;
use crate::station::RadioHttpClient;

/// Container for all bootstrapped services.
///
/// This struct holds all the wired services created during bootstrap. The
/// embedding app (console, desktop shell) drives playback and station
/// selection through it.
#[derive(Clone)]
pub struct RadioServices {
    /// Backend client for status, directory and wake-up requests.
    pub api: Arc<dyn RadioClient>,
    /// Observable state of the selected station.
    pub store: Arc<StationStore>,
    /// Cached station directory.
    pub directory: Arc<StationDirectory>,
    /// Status polling and wake-up orchestration.
    pub status_monitor: Arc<StatusMonitor>,
    /// Periodic directory refresh.
    pub directory_monitor: Arc<DirectoryMonitor>,
    /// Playback state machine and recovery.
    pub playback: Arc<PlaybackCoordinator>,
    /// Backend URL builder.
    pub context: ApiContext,
    /// Broadcast channel sender for real-time events.
    pub broadcast_tx: broadcast::Sender<BroadcastEvent>,
    /// Event bridge for emitting events to subscribers.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Shared HTTP client for connection pooling.
    http_client: Client,
    /// Task spawner for background operations.
    pub spawner: TokioSpawner,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
}

impl fmt::Debug for RadioServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioServices").finish_non_exhaustive()
    }
}

impl RadioServices {
    /// Returns the shared HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Starts the background services. Status polling starts separately,
    /// when a station is selected.
    pub fn start_background_tasks(&self) {
        self.directory_monitor.clone().start_monitoring();
        log::info!("[Bootstrap] Background services started");
    }

    /// Selects a station and begins polling its status.
    pub fn select_station(&self, slug: &str) -> MixplaResult<()> {
        self.status_monitor.clone().select_station(slug)
    }

    /// Acts on the user's play intent.
    ///
    /// An asleep station is woken instead of played; its stream URL would
    /// only return errors until the broadcast is up.
    pub async fn press_play(&self) -> MixplaResult<()> {
        let Some(slug) = self.status_monitor.current_slug() else {
            return Err(MixplaError::InvalidRequest(
                "No station selected".to_string(),
            ));
        };
        if self.store.snapshot().phase == StationPhase::Asleep {
            return self.status_monitor.clone().wake().await;
        }
        self.playback
            .clone()
            .begin(&self.context.stream_url(&slug))
            .await;
        Ok(())
    }

    /// Initiates graceful shutdown of all services.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        // Signal cancellation to all background tasks
        self.cancel_token.cancel();

        self.status_monitor.stop();
        self.directory_monitor.stop();
        self.playback.stop().await;

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for all backend communication.
///
/// Using a shared client enables connection pooling. It is created once
/// during bootstrap and injected into services that need it.
fn create_http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

/// Bootstraps all services with the default headless playback engine.
pub fn bootstrap_services(config: &Config) -> MixplaResult<RadioServices> {
    bootstrap_services_with_engine(config, Arc::new(NullEngine))
}

/// Bootstraps all application services with their dependencies.
///
/// This is the composition root where all services are instantiated and
/// wired together. The wiring order matters - services are created in
/// dependency order:
///
/// 1. Shared infrastructure (HTTP client, broadcast channel, cancellation token)
/// 2. Backend client (depends on HTTP client, context, optional tokens)
/// 3. Station store and directory
/// 4. Status monitor (depends on client, store, event bridge)
/// 5. Directory monitor (depends on client, directory, event bridge)
/// 6. Playback coordinator (depends on engine, stats, event bridge)
///
/// # Errors
///
/// Returns an error if the configuration fails validation.
pub fn bootstrap_services_with_engine(
    config: &Config,
    engine: Arc<dyn PlaybackEngine>,
) -> MixplaResult<RadioServices> {
    config.validate().map_err(MixplaError::Configuration)?;

    // Create task spawner from current runtime
    let spawner = TokioSpawner::current();

    // Create shared HTTP client for connection pooling
    let http_client = create_http_client(config.http_timeout_secs);

    // Create broadcast channel for real-time events to subscribers
    let (broadcast_tx, _) = broadcast::channel::<BroadcastEvent>(config.event_channel_capacity);

    // Create the event bridge that maps domain events to broadcast transport
    let event_bridge = Arc::new(BroadcastEventBridge::with_sender(broadcast_tx.clone()));

    // Create cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let context = ApiContext::new(&config.base_url);

    // Create the backend client (implements the station traits)
    let client_impl = match &config.auth_token {
        Some(token) => {
            let tokens = Arc::new(TokenManager::new(
                Arc::new(StaticTokenSource::new(token.clone())),
                Duration::from_secs(config.token_min_validity_secs),
            ));
            Arc::new(RadioHttpClient::with_token_manager(
                http_client.clone(),
                context.clone(),
                tokens,
            ))
        }
        None => Arc::new(RadioHttpClient::new(http_client.clone(), context.clone())),
    };

    // Shared mutable state
    let store = Arc::new(StationStore::new(""));
    let directory = Arc::new(StationDirectory::new());
    let shared_config = Arc::new(config.clone());

    // Wire up the status monitor with its dependencies
    let status_monitor = Arc::new(StatusMonitor::new(
        Arc::clone(&client_impl) as Arc<dyn StationControl>,
        Arc::clone(&store),
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        spawner.clone(),
        Arc::clone(&shared_config),
    ));

    // Wire up the directory monitor with its dependencies
    let directory_monitor = Arc::new(DirectoryMonitor::new(
        Arc::clone(&client_impl) as Arc<dyn StationDirectorySource>,
        Arc::clone(&directory),
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        spawner.clone(),
        Duration::from_millis(config.directory_interval_ms),
    ));

    // Wire up the playback coordinator with its dependencies
    let playback = Arc::new(PlaybackCoordinator::new(
        engine,
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        Arc::new(SegmentStats::new()),
        spawner.clone(),
        config.recovery.clone(),
    ));

    // Coerce to the general RadioClient trait for storage
    let api: Arc<dyn RadioClient> = client_impl;

    Ok(RadioServices {
        api,
        store,
        directory,
        status_monitor,
        directory_monitor,
        playback,
        context,
        broadcast_tx,
        event_bridge,
        http_client,
        spawner,
        cancel_token,
    })
}
