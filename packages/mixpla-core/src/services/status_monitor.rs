//! Station status polling and wake-up orchestration.
//!
//! Responsibilities:
//! - Poll the backend for the selected station's status on a fixed cadence
//! - Switch between regular and fast polling around wake-up requests
//! - Reduce fetch outcomes into the station store and emit change events
//! - Stop polling when the station is confirmed asleep or auth is rejected
//!
//! Only one polling loop is live at a time. Every restart bumps a generation
//! counter and cancels the previous loop's token, so responses from a
//! superseded loop can never reach the store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::{MixplaError, MixplaResult};
use crate::events::{AuthEvent, EventEmitter, StationEvent};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::services::polling::{PollMode, PollingHandle};
use crate::state::Config;
use crate::station::client::{StatusError, WakeError};
use crate::station::store::{StationStore, StationUpdate};
use crate::station::traits::StationControl;
use crate::station::types::FetchOutcome;
use crate::utils::{now_millis, validate_station_slug};

const STOP_REASON_ASLEEP: &str = "stationAsleep";
const STOP_REASON_AUTH: &str = "authenticationRequired";

/// What a single poll decided the loop should do next.
enum PollStep {
    /// Apply the outcome and keep polling.
    Continue(FetchOutcome),
    /// Station confirmed asleep, stop unless a wake-up is in flight.
    StopAsleep,
    /// Authentication rejected, stop and require login.
    StopAuth(String),
}

struct MonitorInner {
    slug: Option<String>,
    handle: Option<PollingHandle>,
    mode: PollMode,
    poll_now: Arc<Notify>,
}

/// Polls the selected station's status and drives wake-up recovery.
pub struct StatusMonitor {
    api: Arc<dyn StationControl>,
    store: Arc<StationStore>,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    config: Arc<Config>,
    generation: AtomicU64,
    inner: Mutex<MonitorInner>,
}

impl StatusMonitor {
    pub fn new(
        api: Arc<dyn StationControl>,
        store: Arc<StationStore>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
        config: Arc<Config>,
    ) -> Self {
        Self {
            api,
            store,
            emitter,
            spawner,
            config,
            generation: AtomicU64::new(0),
            inner: Mutex::new(MonitorInner {
                slug: None,
                handle: None,
                mode: PollMode::Regular,
                poll_now: Arc::new(Notify::new()),
            }),
        }
    }

    /// Slug of the station currently being polled, if any.
    pub fn current_slug(&self) -> Option<String> {
        self.inner.lock().slug.clone()
    }

    /// Cadence of the live polling loop.
    pub fn poll_mode(&self) -> PollMode {
        self.inner.lock().mode
    }

    /// True while a polling loop is live.
    pub fn is_polling(&self) -> bool {
        self.inner.lock().handle.is_some()
    }

    /// Starts (or restarts) the polling loop for `slug` at the given cadence.
    ///
    /// Any previous loop is cancelled first and its late responses are
    /// discarded by the generation check.
    pub fn start(self: Arc<Self>, slug: &str, mode: PollMode) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let poll_now = Arc::new(Notify::new());
        {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.handle.take() {
                previous.cancel();
            }
            inner.slug = Some(slug.to_string());
            inner.handle = Some(PollingHandle::new(token.clone()));
            inner.mode = mode;
            inner.poll_now = poll_now.clone();
        }
        log::info!("[StatusMonitor] Starting {:?} polling for '{}'", mode, slug);
        let monitor = self.clone();
        let slug = slug.to_string();
        self.spawner.spawn(async move {
            monitor.run_loop(slug, mode, generation, token, poll_now).await;
        });
    }

    /// Stops polling without emitting a stop event.
    ///
    /// Used for caller-initiated teardown (station switch, shutdown). The
    /// generation bump invalidates any in-flight response.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let handle = self.inner.lock().handle.take();
        if let Some(handle) = handle {
            handle.cancel();
            log::info!("[StatusMonitor] Polling stopped");
        }
    }

    /// Requests an immediate poll and pushes the next scheduled tick out by
    /// a full period.
    pub fn poll_now(&self) {
        let inner = self.inner.lock();
        if inner.handle.is_some() {
            inner.poll_now.notify_one();
        }
    }

    /// Switches polling to a different station.
    ///
    /// The previous loop is stopped before the store is reset, so a response
    /// that was in flight for the old station cannot land on the new view.
    pub fn select_station(self: Arc<Self>, slug: &str) -> MixplaResult<()> {
        validate_station_slug(slug)?;
        self.stop();
        self.store.reset_for(slug);
        self.clone().start(slug, PollMode::Regular);
        Ok(())
    }

    /// Sends a wake-up request for the current station and switches to fast
    /// polling on success.
    ///
    /// A guard timer bounds the waking window: if the station has not come
    /// on air when it fires, the waking flag is cleared and a timeout event
    /// is emitted, after which a confirmed-asleep poll stops the loop again.
    pub async fn wake(self: Arc<Self>) -> MixplaResult<()> {
        let Some(slug) = self.current_slug() else {
            return Err(MixplaError::InvalidRequest(
                "No station selected to wake up".to_string(),
            ));
        };
        self.emitter.emit_station(StationEvent::WakeRequested {
            slug: slug.clone(),
            timestamp: now_millis(),
        });
        match self.api.wake(&slug).await {
            Ok(()) => {
                self.store.mark_waking();
                self.clone().start(&slug, PollMode::Fast);

                // Generation is read after the restart so the guard dies with
                // this polling loop.
                let generation = self.generation.load(Ordering::SeqCst);
                let guard_delay = Duration::from_millis(self.config.warmup_guard_ms);
                let monitor = self.clone();
                let guard_slug = slug.clone();
                self.spawner.spawn(async move {
                    tokio::time::sleep(guard_delay).await;
                    if monitor.generation.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    if monitor.store.clear_waking() {
                        log::warn!(
                            "[StatusMonitor] '{}' did not come on air within the warm-up window",
                            guard_slug
                        );
                        monitor.emitter.emit_station(StationEvent::WarmupTimedOut {
                            slug: guard_slug,
                            timestamp: now_millis(),
                        });
                    }
                });
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "[StatusMonitor] Wake-up request for '{}' failed: {}",
                    slug,
                    err
                );
                self.emitter.emit_station(StationEvent::WakeFailed {
                    slug: slug.clone(),
                    error: err.to_string(),
                    timestamp: now_millis(),
                });
                if let WakeError::Auth(reason) = &err {
                    self.emitter.emit_auth(AuthEvent::LoginRequired {
                        reason: reason.clone(),
                        timestamp: now_millis(),
                    });
                }
                Err(err.into())
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Polling loop
    // ────────────────────────────────────────────────────────────────────

    async fn run_loop(
        self: Arc<Self>,
        slug: String,
        initial_mode: PollMode,
        generation: u64,
        cancel_token: CancellationToken,
        poll_now: Arc<Notify>,
    ) {
        let mut mode = initial_mode;
        let mut interval = tokio::time::interval(self.poll_period(mode));

        loop {
            let is_manual = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => false,
                _ = poll_now.notified() => true,
            };
            if is_manual {
                interval.reset();
            }

            let step = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                step = self.poll_once(&slug) => step,
            };
            if self.generation.load(Ordering::SeqCst) != generation {
                break;
            }

            match step {
                PollStep::Continue(outcome) => {
                    let update = self.store.apply(&outcome);
                    self.emit_changes(&slug, &update);
                    if mode == PollMode::Fast && update.current.phase.is_on_air() {
                        mode = PollMode::Regular;
                        let period = self.poll_period(mode);
                        interval =
                            tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                        self.note_mode(generation, mode);
                        log::info!(
                            "[StatusMonitor] '{}' is on air, easing to regular polling",
                            slug
                        );
                    }
                }
                PollStep::StopAsleep => {
                    let update = self.store.apply(&FetchOutcome::Asleep);
                    self.emit_changes(&slug, &update);
                    if update.current.waking {
                        log::debug!(
                            "[StatusMonitor] '{}' still asleep while waking up, polling continues",
                            slug
                        );
                    } else {
                        self.finish_polling(&slug, generation, STOP_REASON_ASLEEP);
                        return;
                    }
                }
                PollStep::StopAuth(reason) => {
                    let update = self.store.apply(&FetchOutcome::Failed {
                        message: format!("Authentication failed: {}", reason),
                    });
                    self.emit_changes(&slug, &update);
                    self.emitter.emit_auth(AuthEvent::LoginRequired {
                        reason,
                        timestamp: now_millis(),
                    });
                    self.finish_polling(&slug, generation, STOP_REASON_AUTH);
                    return;
                }
            }
        }
    }

    async fn poll_once(&self, slug: &str) -> PollStep {
        match self.api.fetch_status(slug).await {
            Ok(status) => PollStep::Continue(FetchOutcome::Payload(status)),
            Err(StatusError::StationAsleep) => PollStep::StopAsleep,
            Err(StatusError::Auth(reason)) => PollStep::StopAuth(reason),
            Err(err) => {
                log::warn!("[StatusMonitor] Status fetch for '{}' failed: {}", slug, err);
                PollStep::Continue(FetchOutcome::Failed {
                    message: err.to_string(),
                })
            }
        }
    }

    fn emit_changes(&self, slug: &str, update: &StationUpdate) {
        if update.phase_changed() {
            log::info!(
                "[StatusMonitor] '{}' phase: {} -> {}",
                slug,
                update.previous.phase,
                update.current.phase
            );
            self.emitter.emit_station(StationEvent::PhaseChanged {
                slug: slug.to_string(),
                phase: update.current.phase.clone(),
                timestamp: now_millis(),
            });
        }
        if let Some(title) = update.new_track_title() {
            self.emitter.emit_station(StationEvent::NowPlayingChanged {
                slug: slug.to_string(),
                title: title.to_string(),
                timestamp: now_millis(),
            });
        }
    }

    /// Releases the handle and emits the stop event, unless a newer loop has
    /// already taken over.
    fn finish_polling(&self, slug: &str, generation: u64, reason: &str) {
        {
            let mut inner = self.inner.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            if let Some(handle) = inner.handle.take() {
                handle.cancel();
            }
        }
        log::info!("[StatusMonitor] Stopped polling '{}': {}", slug, reason);
        self.emitter.emit_station(StationEvent::PollingStopped {
            slug: slug.to_string(),
            reason: reason.to_string(),
            timestamp: now_millis(),
        });
    }

    fn note_mode(&self, generation: u64, mode: PollMode) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.inner.lock().mode = mode;
        }
    }

    fn poll_period(&self, mode: PollMode) -> Duration {
        let ms = match mode {
            PollMode::Regular => self.config.regular_interval_ms,
            PollMode::Fast => self.config.fast_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
