//! Shared test doubles for service and coordinator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::events::{AuthEvent, DirectoryEvent, EventEmitter, PlayerEvent, StationEvent};
use crate::station::client::{StatusResult, WakeResult};
use crate::station::traits::{StationDirectorySource, StationStatusSource, StationWakeControl};
use crate::station::types::{StationStatus, StationSummary};

/// Emitter that records every event for later assertions.
#[derive(Default)]
pub(crate) struct RecordingEmitter {
    station: Mutex<Vec<StationEvent>>,
    player: Mutex<Vec<PlayerEvent>>,
    directory: Mutex<Vec<DirectoryEvent>>,
    auth: Mutex<Vec<AuthEvent>>,
}

impl RecordingEmitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn station_events(&self) -> Vec<StationEvent> {
        self.station.lock().clone()
    }

    pub(crate) fn player_events(&self) -> Vec<PlayerEvent> {
        self.player.lock().clone()
    }

    pub(crate) fn directory_events(&self) -> Vec<DirectoryEvent> {
        self.directory.lock().clone()
    }

    pub(crate) fn auth_events(&self) -> Vec<AuthEvent> {
        self.auth.lock().clone()
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit_station(&self, event: StationEvent) {
        self.station.lock().push(event);
    }

    fn emit_player(&self, event: PlayerEvent) {
        self.player.lock().push(event);
    }

    fn emit_directory(&self, event: DirectoryEvent) {
        self.directory.lock().push(event);
    }

    fn emit_auth(&self, event: AuthEvent) {
        self.auth.lock().push(event);
    }
}

/// Builds an on-air status payload with the given song title.
pub(crate) fn on_air_status(song: &str) -> StationStatus {
    StationStatus {
        name: "Bratan".to_string(),
        color: Some("#ff7700".to_string()),
        current_status: Some("ON_LINE".to_string()),
        current_song: Some(song.to_string()),
        ..Default::default()
    }
}

/// Builds a warming-up status payload.
pub(crate) fn warming_status() -> StationStatus {
    StationStatus {
        name: "Bratan".to_string(),
        current_status: Some("WARMING_UP".to_string()),
        ..Default::default()
    }
}

/// Builds a directory entry for the given slug.
pub(crate) fn directory_entry(slug: &str) -> StationSummary {
    StationSummary {
        name: slug.to_string(),
        slug_name: slug.to_string(),
        ..Default::default()
    }
}

/// Backend double driven by scripted responses.
///
/// Scripts are consumed front to back; when a script runs dry the double
/// answers with an on-air payload (status), success (wake), or a one-station
/// list (directory). An optional delay simulates in-flight request time
/// under paused-clock tests.
pub(crate) struct ScriptedApi {
    statuses: Mutex<VecDeque<StatusResult<StationStatus>>>,
    wakes: Mutex<VecDeque<WakeResult<()>>>,
    directories: Mutex<VecDeque<StatusResult<Vec<StationSummary>>>>,
    pub(crate) fetch_count: AtomicUsize,
    pub(crate) wake_count: AtomicUsize,
    pub(crate) directory_count: AtomicUsize,
    pub(crate) fetched_slugs: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            wakes: Mutex::new(VecDeque::new()),
            directories: Mutex::new(VecDeque::new()),
            fetch_count: AtomicUsize::new(0),
            wake_count: AtomicUsize::new(0),
            directory_count: AtomicUsize::new(0),
            fetched_slugs: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub(crate) fn push_status(&self, result: StatusResult<StationStatus>) {
        self.statuses.lock().push_back(result);
    }

    pub(crate) fn push_wake(&self, result: WakeResult<()>) {
        self.wakes.lock().push_back(result);
    }

    pub(crate) fn push_directory(&self, result: StatusResult<Vec<StationSummary>>) {
        self.directories.lock().push_back(result);
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StationStatusSource for ScriptedApi {
    async fn fetch_status(&self, slug: &str) -> StatusResult<StationStatus> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetched_slugs.lock().push(slug.to_string());
        let next = self.statuses.lock().pop_front();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        next.unwrap_or_else(|| Ok(on_air_status("Night Drive")))
    }
}

#[async_trait]
impl StationWakeControl for ScriptedApi {
    async fn wake(&self, _slug: &str) -> WakeResult<()> {
        self.wake_count.fetch_add(1, Ordering::SeqCst);
        self.wakes.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl StationDirectorySource for ScriptedApi {
    async fn fetch_stations(&self) -> StatusResult<Vec<StationSummary>> {
        self.directory_count.fetch_add(1, Ordering::SeqCst);
        let next = self.directories.lock().pop_front();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        next.unwrap_or_else(|| Ok(vec![directory_entry("bratan")]))
    }
}
