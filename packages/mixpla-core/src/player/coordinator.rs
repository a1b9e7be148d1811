//! Playback state machine and error recovery.
//!
//! Responsibilities:
//! - Track the playback phase and broadcast phase changes
//! - Retry network-fatal errors with a bounded, growing delay
//! - Attempt one in-place recovery for media-fatal errors
//! - Nudge stalled streams and resume after connectivity returns
//! - Feed segment download results into the rolling statistics
//!
//! At most one reload is pending at a time. Scheduling a reload cancels the
//! previous pending one, and `stop`/`begin` cancel whatever is pending.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::events::{EventEmitter, PlayerEvent};
use crate::player::engine::{EngineErrorKind, EngineEvent, PlaybackEngine};
use crate::player::segment_stats::{SegmentStats, SegmentStatsSnapshot};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::state::RecoveryConfig;
use crate::utils::now_millis;

const STALL_TRIGGER_BUFFER: &str = "bufferStalled";
const STALL_TRIGGER_ONLINE: &str = "connectivityRestored";

/// Phases of the playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerPhase {
    /// No playback wanted.
    Idle,
    /// A source is set and the stream is loading.
    Loading,
    /// Audio is rendering.
    Playing,
    /// Playback paused to refill the buffer.
    Buffering,
    /// A recovery attempt is scheduled or running.
    Recovering,
    /// Recovery was exhausted or the error was unrecoverable.
    Failed,
}

impl std::fmt::Display for PlayerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Buffering => "buffering",
            Self::Recovering => "recovering",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

struct CoordinatorInner {
    phase: PlayerPhase,
    retry_count: u32,
    media_recovery_used: bool,
    source_url: Option<String>,
    pending_reload: Option<CancellationToken>,
}

/// What a network-fatal error decided under the lock.
enum RecoveryDecision {
    Retry {
        attempt: u32,
        delay: Duration,
        token: CancellationToken,
    },
    GiveUp,
    Ignore,
}

/// Drives a [`PlaybackEngine`] and recovers it from errors.
pub struct PlaybackCoordinator {
    engine: Arc<dyn PlaybackEngine>,
    emitter: Arc<dyn EventEmitter>,
    stats: Arc<SegmentStats>,
    spawner: TokioSpawner,
    recovery: RecoveryConfig,
    inner: Mutex<CoordinatorInner>,
}

impl PlaybackCoordinator {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        emitter: Arc<dyn EventEmitter>,
        stats: Arc<SegmentStats>,
        spawner: TokioSpawner,
        recovery: RecoveryConfig,
    ) -> Self {
        Self {
            engine,
            emitter,
            stats,
            spawner,
            recovery,
            inner: Mutex::new(CoordinatorInner {
                phase: PlayerPhase::Idle,
                retry_count: 0,
                media_recovery_used: false,
                source_url: None,
                pending_reload: None,
            }),
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.inner.lock().phase
    }

    pub fn source_url(&self) -> Option<String> {
        self.inner.lock().source_url.clone()
    }

    #[must_use]
    pub fn stats_snapshot(&self) -> SegmentStatsSnapshot {
        self.stats.snapshot()
    }

    /// Starts playback of a stream URL.
    ///
    /// Resets the retry budget and segment statistics. An immediate load
    /// failure enters the normal network recovery path rather than
    /// surfacing an error here.
    pub async fn begin(self: Arc<Self>, url: &str) {
        {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.pending_reload.take() {
                previous.cancel();
            }
            inner.retry_count = 0;
            inner.media_recovery_used = false;
            inner.source_url = Some(url.to_string());
        }
        self.stats.reset();
        self.set_phase(PlayerPhase::Loading);
        log::info!("[PlaybackCoordinator] Loading stream {}", url);
        if let Err(err) = self.engine.load_source(url).await {
            log::warn!("[PlaybackCoordinator] Initial load failed: {}", err);
            Self::on_network_fatal(&self, err.to_string());
        }
    }

    /// Stops playback and clears the source.
    pub async fn stop(&self) {
        {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.pending_reload.take() {
                previous.cancel();
            }
            inner.source_url = None;
            inner.retry_count = 0;
            inner.media_recovery_used = false;
        }
        self.set_phase(PlayerPhase::Idle);
        if let Err(err) = self.engine.stop().await {
            log::warn!("[PlaybackCoordinator] Engine stop failed: {}", err);
        }
    }

    /// Reacts to an engine event.
    pub async fn handle_event(self: Arc<Self>, event: EngineEvent) {
        match event {
            EngineEvent::ManifestParsed => {
                let was_recovering = {
                    let mut inner = self.inner.lock();
                    inner.retry_count = 0;
                    inner.media_recovery_used = false;
                    inner.phase == PlayerPhase::Recovering
                };
                if was_recovering {
                    self.set_phase(PlayerPhase::Loading);
                }
                self.emitter.emit_player(PlayerEvent::ManifestLoaded {
                    timestamp: now_millis(),
                });
            }
            EngineEvent::Playing => {
                self.inner.lock().media_recovery_used = false;
                self.set_phase(PlayerPhase::Playing);
            }
            EngineEvent::Waiting => {
                if self.phase() == PlayerPhase::Playing {
                    self.set_phase(PlayerPhase::Buffering);
                }
            }
            EngineEvent::Paused | EngineEvent::Ended => {
                self.set_phase(PlayerPhase::Idle);
            }
            EngineEvent::Stalled => {
                let active = {
                    let inner = self.inner.lock();
                    inner.source_url.is_some()
                        && matches!(
                            inner.phase,
                            PlayerPhase::Loading | PlayerPhase::Playing | PlayerPhase::Buffering
                        )
                };
                if active {
                    self.kick_engine(STALL_TRIGGER_BUFFER).await;
                    self.set_phase(PlayerPhase::Buffering);
                }
            }
            EngineEvent::LevelLoaded { title } | EngineEvent::FragmentChanged { title } => {
                if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
                    self.emitter.emit_player(PlayerEvent::TrackTitle {
                        title,
                        timestamp: now_millis(),
                    });
                }
            }
            EngineEvent::FragmentLoaded {
                load_time_ms,
                bytes,
                ..
            } => {
                self.stats.record_loaded(load_time_ms, bytes);
            }
            EngineEvent::FragmentLoadFailed {
                url,
                message,
                status,
            } => {
                log::debug!("[PlaybackCoordinator] Fragment failed: {} ({})", url, message);
                self.stats.record_failed(&url, &message, status);
            }
            EngineEvent::Fatal { kind, message } => match kind {
                EngineErrorKind::Network => Self::on_network_fatal(&self, message),
                EngineErrorKind::Media => self.on_media_fatal(message).await,
                EngineErrorKind::Other => {
                    self.fail(format!("Unrecoverable playback error: {}", message));
                }
            },
        }
    }

    /// Restarts loading after connectivity returns, if playback is stuck in
    /// a loading, buffering or recovering phase.
    pub async fn handle_online(self: Arc<Self>) {
        let should_kick = {
            let mut inner = self.inner.lock();
            let stuck = inner.source_url.is_some()
                && matches!(
                    inner.phase,
                    PlayerPhase::Loading | PlayerPhase::Buffering | PlayerPhase::Recovering
                );
            if stuck {
                if let Some(previous) = inner.pending_reload.take() {
                    previous.cancel();
                }
            }
            stuck
        };
        if should_kick {
            log::info!("[PlaybackCoordinator] Connectivity restored, restarting load");
            self.kick_engine(STALL_TRIGGER_ONLINE).await;
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Recovery paths
    // ────────────────────────────────────────────────────────────────────

    /// Schedules a delayed stream reload, or fails playback once the retry
    /// budget is spent. The delay grows linearly with the attempt number.
    fn on_network_fatal(coordinator: &Arc<Self>, message: String) {
        let decision = {
            let mut inner = coordinator.inner.lock();
            if inner.source_url.is_none() {
                RecoveryDecision::Ignore
            } else if inner.retry_count >= coordinator.recovery.max_retries {
                RecoveryDecision::GiveUp
            } else {
                inner.retry_count += 1;
                let attempt = inner.retry_count;
                if let Some(previous) = inner.pending_reload.take() {
                    previous.cancel();
                }
                let token = CancellationToken::new();
                inner.pending_reload = Some(token.clone());
                RecoveryDecision::Retry {
                    attempt,
                    delay: Duration::from_millis(
                        coordinator.recovery.base_delay_ms * u64::from(attempt),
                    ),
                    token,
                }
            }
        };

        match decision {
            RecoveryDecision::Ignore => {}
            RecoveryDecision::GiveUp => {
                coordinator.emitter.emit_player(PlayerEvent::RecoveryExhausted {
                    message: message.clone(),
                    timestamp: now_millis(),
                });
                coordinator.fail(format!(
                    "Playback failed after {} recovery attempts: {}",
                    coordinator.recovery.max_retries, message
                ));
            }
            RecoveryDecision::Retry {
                attempt,
                delay,
                token,
            } => {
                log::warn!(
                    "[PlaybackCoordinator] Network error ({}), retry {}/{} in {}ms",
                    message,
                    attempt,
                    coordinator.recovery.max_retries,
                    delay.as_millis()
                );
                coordinator.set_phase(PlayerPhase::Recovering);
                coordinator.emitter.emit_player(PlayerEvent::RecoveryScheduled {
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                    timestamp: now_millis(),
                });
                let reload_coordinator = coordinator.clone();
                coordinator.spawner.spawn(async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            reload_coordinator.run_scheduled_reload(attempt).await;
                        }
                    }
                });
            }
        }
    }

    async fn run_scheduled_reload(self: Arc<Self>, attempt: u32) {
        let url = {
            let mut inner = self.inner.lock();
            if inner.phase != PlayerPhase::Recovering {
                return;
            }
            inner.pending_reload = None;
            match inner.source_url.clone() {
                Some(url) => url,
                None => return,
            }
        };
        log::info!(
            "[PlaybackCoordinator] Recovery attempt {}: reloading {}",
            attempt,
            url
        );
        if let Err(err) = self.engine.load_source(&url).await {
            log::warn!(
                "[PlaybackCoordinator] Recovery attempt {} failed: {}",
                attempt,
                err
            );
            Self::on_network_fatal(&self, err.to_string());
        }
    }

    /// Tries the engine's one-shot media recovery. A second media error
    /// before playback restarts fails the stream.
    async fn on_media_fatal(&self, message: String) {
        let first_error = {
            let mut inner = self.inner.lock();
            if inner.media_recovery_used {
                false
            } else {
                inner.media_recovery_used = true;
                true
            }
        };
        if !first_error {
            self.fail(format!("Media error could not be recovered: {}", message));
            return;
        }
        log::warn!(
            "[PlaybackCoordinator] Media error ({}), attempting recovery",
            message
        );
        self.set_phase(PlayerPhase::Recovering);
        if let Err(err) = self.engine.recover_media_error().await {
            self.fail(format!("Media recovery failed: {}", err));
            return;
        }
        self.emitter.emit_player(PlayerEvent::MediaRecovery {
            timestamp: now_millis(),
        });
    }

    /// Issues a load restart that does not consume the retry budget.
    async fn kick_engine(&self, trigger: &str) {
        if let Err(err) = self.engine.start_load().await {
            log::warn!("[PlaybackCoordinator] Load restart failed: {}", err);
            return;
        }
        self.emitter.emit_player(PlayerEvent::StallRecovery {
            trigger: trigger.to_string(),
            timestamp: now_millis(),
        });
    }

    fn fail(&self, message: String) {
        {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.pending_reload.take() {
                previous.cancel();
            }
            inner.phase = PlayerPhase::Failed;
        }
        log::error!("[PlaybackCoordinator] {}", message);
        self.emitter.emit_player(PlayerEvent::PhaseChanged {
            phase: PlayerPhase::Failed,
            message: Some(message),
            timestamp: now_millis(),
        });
    }

    fn set_phase(&self, phase: PlayerPhase) {
        let changed = {
            let mut inner = self.inner.lock();
            if inner.phase == phase {
                false
            } else {
                log::debug!(
                    "[PlaybackCoordinator] Phase: {} -> {}",
                    inner.phase,
                    phase
                );
                inner.phase = phase;
                true
            }
        };
        if changed {
            self.emitter.emit_player(PlayerEvent::PhaseChanged {
                phase,
                message: None,
                timestamp: now_millis(),
            });
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::engine::EngineResult;
    use crate::test_support::RecordingEmitter;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STREAM_URL: &str = "https://radio.test/bratan/radio/stream.m3u8";

    #[derive(Default)]
    struct ScriptedEngine {
        load_results: Mutex<VecDeque<EngineResult<()>>>,
        loaded_urls: Mutex<Vec<String>>,
        start_load_count: AtomicUsize,
        media_recovery_count: AtomicUsize,
        stop_count: AtomicUsize,
    }

    impl ScriptedEngine {
        fn loads(&self) -> usize {
            self.loaded_urls.lock().len()
        }
    }

    #[async_trait]
    impl PlaybackEngine for ScriptedEngine {
        async fn load_source(&self, url: &str) -> EngineResult<()> {
            self.loaded_urls.lock().push(url.to_string());
            self.load_results.lock().pop_front().unwrap_or(Ok(()))
        }

        async fn start_load(&self) -> EngineResult<()> {
            self.start_load_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn recover_media_error(&self) -> EngineResult<()> {
            self.media_recovery_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> EngineResult<()> {
            self.stop_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn paused_coordinator(
        engine: Arc<ScriptedEngine>,
    ) -> (Arc<PlaybackCoordinator>, Arc<RecordingEmitter>) {
        let emitter = Arc::new(RecordingEmitter::new());
        let coordinator = Arc::new(PlaybackCoordinator::new(
            engine,
            emitter.clone(),
            Arc::new(SegmentStats::new()),
            TokioSpawner::current(),
            RecoveryConfig::default(),
        ));
        (coordinator, emitter)
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ms(ms: u64) {
        settle().await;
        tokio::time::advance(Duration::from_millis(ms)).await;
        settle().await;
    }

    fn network_fatal(message: &str) -> EngineEvent {
        EngineEvent::Fatal {
            kind: EngineErrorKind::Network,
            message: message.to_string(),
        }
    }

    fn media_fatal(message: &str) -> EngineEvent {
        EngineEvent::Fatal {
            kind: EngineErrorKind::Media,
            message: message.to_string(),
        }
    }

    fn scheduled_retries(emitter: &RecordingEmitter) -> Vec<(u32, u64)> {
        emitter
            .player_events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::RecoveryScheduled {
                    attempt, delay_ms, ..
                } => Some((attempt, delay_ms)),
                _ => None,
            })
            .collect()
    }

    fn exhausted_count(emitter: &RecordingEmitter) -> usize {
        emitter
            .player_events()
            .iter()
            .filter(|event| matches!(event, PlayerEvent::RecoveryExhausted { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn begin_loads_the_source_and_reports_loading() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        assert_eq!(*engine.loaded_urls.lock(), vec![STREAM_URL]);
        assert_eq!(coordinator.phase(), PlayerPhase::Loading);
        assert!(emitter.player_events().iter().any(|event| matches!(
            event,
            PlayerEvent::PhaseChanged {
                phase: PlayerPhase::Loading,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn network_errors_retry_with_growing_delay_then_fail() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        assert_eq!(engine.loads(), 1);

        coordinator.clone().handle_event(network_fatal("timeout")).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Recovering);
        advance_ms(1_999).await;
        assert_eq!(engine.loads(), 1);
        advance_ms(1).await;
        assert_eq!(engine.loads(), 2);

        coordinator.clone().handle_event(network_fatal("timeout")).await;
        advance_ms(4_000).await;
        assert_eq!(engine.loads(), 3);

        coordinator.clone().handle_event(network_fatal("timeout")).await;
        advance_ms(6_000).await;
        assert_eq!(engine.loads(), 4);

        // Fourth failure exhausts the budget.
        coordinator.clone().handle_event(network_fatal("timeout")).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Failed);
        assert_eq!(exhausted_count(&emitter), 1);
        assert_eq!(
            scheduled_retries(&emitter),
            vec![(1, 2_000), (2, 4_000), (3, 6_000)]
        );

        advance_ms(60_000).await;
        assert_eq!(engine.loads(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn manifest_parsed_resets_the_retry_budget() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(network_fatal("timeout")).await;
        advance_ms(2_000).await;
        assert_eq!(engine.loads(), 2);

        coordinator.clone().handle_event(EngineEvent::ManifestParsed).await;
        assert!(emitter
            .player_events()
            .iter()
            .any(|event| matches!(event, PlayerEvent::ManifestLoaded { .. })));

        // The next failure starts the ladder over at attempt 1.
        coordinator.clone().handle_event(network_fatal("timeout")).await;
        assert_eq!(scheduled_retries(&emitter), vec![(1, 2_000), (1, 2_000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn media_error_recovers_once_per_playback() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(media_fatal("decode error")).await;
        assert_eq!(engine.media_recovery_count.load(Ordering::SeqCst), 1);
        assert!(emitter
            .player_events()
            .iter()
            .any(|event| matches!(event, PlayerEvent::MediaRecovery { .. })));

        // A second media error before playback restarts is fatal.
        coordinator.clone().handle_event(media_fatal("decode error")).await;
        assert_eq!(engine.media_recovery_count.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.phase(), PlayerPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn media_recovery_is_available_again_after_playing() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, _emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(media_fatal("decode error")).await;
        coordinator.clone().handle_event(EngineEvent::Playing).await;
        coordinator.clone().handle_event(media_fatal("decode error")).await;

        assert_eq!(engine.media_recovery_count.load(Ordering::SeqCst), 2);
        assert_ne!(coordinator.phase(), PlayerPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn unclassified_fatal_fails_without_recovery() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator
            .clone()
            .handle_event(EngineEvent::Fatal {
                kind: EngineErrorKind::Other,
                message: "engine destroyed".to_string(),
            })
            .await;

        assert_eq!(coordinator.phase(), PlayerPhase::Failed);
        assert!(scheduled_retries(&emitter).is_empty());
        assert_eq!(engine.media_recovery_count.load(Ordering::SeqCst), 0);

        // A failed session stays failed even if more time passes.
        advance_ms(10_000).await;
        assert_eq!(engine.loads(), 1);
        assert_eq!(coordinator.phase(), PlayerPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn stall_restarts_load_without_consuming_the_budget() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(EngineEvent::Playing).await;
        coordinator.clone().handle_event(EngineEvent::Stalled).await;

        assert_eq!(engine.start_load_count.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.phase(), PlayerPhase::Buffering);
        assert!(emitter.player_events().iter().any(|event| matches!(
            event,
            PlayerEvent::StallRecovery { trigger, .. } if trigger == STALL_TRIGGER_BUFFER
        )));

        // The retry ladder still starts at attempt 1 afterwards.
        coordinator.clone().handle_event(network_fatal("timeout")).await;
        assert_eq!(scheduled_retries(&emitter), vec![(1, 2_000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn online_restarts_load_only_while_stuck() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(EngineEvent::Playing).await;
        coordinator.clone().handle_online().await;
        assert_eq!(engine.start_load_count.load(Ordering::SeqCst), 0);

        coordinator.clone().handle_event(network_fatal("offline")).await;
        coordinator.clone().handle_online().await;
        assert_eq!(engine.start_load_count.load(Ordering::SeqCst), 1);
        assert!(emitter.player_events().iter().any(|event| matches!(
            event,
            PlayerEvent::StallRecovery { trigger, .. } if trigger == STALL_TRIGGER_ONLINE
        )));

        // The cancelled pending reload never runs.
        advance_ms(60_000).await;
        assert_eq!(engine.loads(), 1);

        coordinator.stop().await;
        coordinator.clone().handle_online().await;
        assert_eq!(engine.start_load_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_the_pending_reload() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(network_fatal("timeout")).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Recovering);

        coordinator.stop().await;
        assert_eq!(coordinator.phase(), PlayerPhase::Idle);
        assert_eq!(engine.stop_count.load(Ordering::SeqCst), 1);

        advance_ms(60_000).await;
        assert_eq!(engine.loads(), 1);
        assert!(emitter.player_events().iter().any(|event| matches!(
            event,
            PlayerEvent::PhaseChanged {
                phase: PlayerPhase::Idle,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn begin_resets_budget_and_cancels_recovery_for_the_old_source() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin("https://radio.test/a/radio/stream.m3u8").await;
        coordinator.clone().handle_event(network_fatal("timeout")).await;

        coordinator.clone().begin("https://radio.test/b/radio/stream.m3u8").await;
        advance_ms(60_000).await;
        assert_eq!(engine.loads(), 2);

        coordinator.clone().handle_event(network_fatal("timeout")).await;
        advance_ms(2_000).await;
        assert_eq!(engine.loads(), 3);
        assert_eq!(
            engine.loaded_urls.lock().last().map(String::as_str),
            Some("https://radio.test/b/radio/stream.m3u8")
        );
        assert_eq!(scheduled_retries(&emitter), vec![(1, 2_000), (1, 2_000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_events_map_to_phases_and_titles() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator.clone().handle_event(EngineEvent::ManifestParsed).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Loading);

        coordinator.clone().handle_event(EngineEvent::Playing).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Playing);

        coordinator.clone().handle_event(EngineEvent::Waiting).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Buffering);

        coordinator.clone().handle_event(EngineEvent::Paused).await;
        assert_eq!(coordinator.phase(), PlayerPhase::Idle);

        coordinator
            .clone()
            .handle_event(EngineEvent::FragmentChanged {
                title: Some("Midnight Loop".to_string()),
            })
            .await;
        coordinator
            .clone()
            .handle_event(EngineEvent::FragmentChanged { title: None })
            .await;
        coordinator
            .clone()
            .handle_event(EngineEvent::LevelLoaded {
                title: Some("   ".to_string()),
            })
            .await;

        let titles: Vec<String> = emitter
            .player_events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::TrackTitle { title, .. } => Some(title),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Midnight Loop"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fragment_events_feed_the_statistics() {
        let engine = Arc::new(ScriptedEngine::default());
        let (coordinator, _emitter) = paused_coordinator(engine.clone());

        coordinator.clone().begin(STREAM_URL).await;
        coordinator
            .clone()
            .handle_event(EngineEvent::FragmentLoaded {
                url: "https://x/seg1.aac".to_string(),
                load_time_ms: 120,
                bytes: 48_000,
            })
            .await;
        coordinator
            .clone()
            .handle_event(EngineEvent::FragmentLoaded {
                url: "https://x/seg2.aac".to_string(),
                load_time_ms: 80,
                bytes: 52_000,
            })
            .await;
        coordinator
            .clone()
            .handle_event(EngineEvent::FragmentLoadFailed {
                url: "https://x/seg3.aac".to_string(),
                message: "HTTP 404".to_string(),
                status: Some(404),
            })
            .await;

        let snapshot = coordinator.stats_snapshot();
        assert_eq!(snapshot.segments_loaded, 2);
        assert_eq!(snapshot.segments_failed, 1);
        assert_eq!(snapshot.total_bytes, 100_000);
        assert_eq!(snapshot.average_load_time_ms, 100.0);
        assert_eq!(snapshot.recent_errors[0].status, Some(404));
    }
}
