//! Derived station state and the reducer that maintains it.
//!
//! [`StationStore`] holds the current [`StationView`] in a
//! `tokio::sync::watch` channel. Polling results are folded in through a
//! pure reducer; watchers (UI layers, the console printer) observe the view
//! read-only and are only notified when it materially changes.

use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::types::{FetchOutcome, ServerStatus, StationColor, StationPhase, StationStatus};
use crate::station::types::humanize_status;
use crate::utils::now_millis;

/// Status line shown before the first poll completes.
const LOADING_STATUS_LINE: &str = "Loading...";

/// Phase message shown before the first poll completes.
const UNLOADED_MESSAGE: &str = "Status not loaded yet.";

/// Status line shown while a station is asleep.
const ASLEEP_STATUS_LINE: &str = "Station is asleep. Press play to wake it up.";

/// Render model for the currently selected station.
///
/// Metadata fields (`station_name`, `color`, `now_playing`) are sticky: they
/// only move forward when a poll carries better data, and survive transient
/// fetch failures so the UI does not flicker back to an empty card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    /// Slug of the station this view describes.
    pub slug: String,
    /// Derived broadcast phase.
    #[serde(flatten)]
    pub phase: StationPhase,
    /// Display name of the station.
    pub station_name: Option<String>,
    /// Validated brand color.
    pub color: Option<StationColor>,
    /// Last known track title.
    pub now_playing: Option<String>,
    /// One-line status summary.
    pub status_line: String,
    /// True while a wake-up request is in flight or warming up.
    pub waking: bool,
    /// Unix timestamp in milliseconds of the last material change.
    pub last_updated_ms: u64,
}

impl StationView {
    /// Returns the view shown before any poll has completed.
    #[must_use]
    pub fn unloaded(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            phase: StationPhase::Error {
                message: UNLOADED_MESSAGE.to_string(),
            },
            station_name: None,
            color: None,
            now_playing: None,
            status_line: LOADING_STATUS_LINE.to_string(),
            waking: false,
            last_updated_ms: 0,
        }
    }
}

/// Before/after pair returned by [`StationStore::apply`].
#[derive(Debug, Clone)]
pub struct StationUpdate {
    /// View before the outcome was applied.
    pub previous: StationView,
    /// View after the outcome was applied.
    pub current: StationView,
}

impl StationUpdate {
    /// Returns true if the derived phase changed in this update.
    #[must_use]
    pub fn phase_changed(&self) -> bool {
        self.previous.phase != self.current.phase
    }

    /// Returns the track title if it changed in this update.
    #[must_use]
    pub fn new_track_title(&self) -> Option<&str> {
        if self.previous.now_playing == self.current.now_playing {
            return None;
        }
        self.current.now_playing.as_deref()
    }
}

/// Holds the derived state for the currently selected station.
pub struct StationStore {
    tx: watch::Sender<StationView>,
}

impl StationStore {
    /// Creates a store for the given station, starting unloaded.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(StationView::unloaded(slug));
        Self { tx }
    }

    /// Replaces the view wholesale for a newly selected station.
    pub fn reset_for(&self, slug: &str) {
        self.tx.send_replace(StationView::unloaded(slug));
    }

    /// Folds a fetch outcome into the view.
    ///
    /// Watchers are only notified when the view materially changes; a poll
    /// that reproduces the current state exactly is absorbed silently.
    pub fn apply(&self, outcome: &FetchOutcome) -> StationUpdate {
        let mut previous = None;
        let mut current = None;
        self.tx.send_if_modified(|view| {
            previous = Some(view.clone());
            let mut next = reduce(view, outcome);
            if next == *view {
                current = Some(view.clone());
                return false;
            }
            next.last_updated_ms = now_millis();
            current = Some(next.clone());
            *view = next;
            true
        });
        StationUpdate {
            previous: previous.unwrap_or_else(|| self.snapshot()),
            current: current.unwrap_or_else(|| self.snapshot()),
        }
    }

    /// Flags a wake-up as in flight. Returns false if already flagged.
    pub fn mark_waking(&self) -> bool {
        self.tx.send_if_modified(|view| {
            if view.waking {
                return false;
            }
            view.waking = true;
            true
        })
    }

    /// Clears the wake-up flag. Returns true if it was set.
    pub fn clear_waking(&self) -> bool {
        self.tx.send_if_modified(|view| {
            if !view.waking {
                return false;
            }
            view.waking = false;
            true
        })
    }

    /// Returns a copy of the current view.
    #[must_use]
    pub fn snapshot(&self) -> StationView {
        self.tx.borrow().clone()
    }

    /// Returns a receiver for observing view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StationView> {
        self.tx.subscribe()
    }

    /// Returns the view changes as an async stream.
    ///
    /// The stream yields the current view immediately, then every material
    /// change after it.
    #[must_use]
    pub fn updates(&self) -> WatchStream<StationView> {
        WatchStream::new(self.tx.subscribe())
    }
}

/// Pure reducer from (current view, fetch outcome) to the next view.
///
/// Precedence: an asleep confirmation beats everything, a fetch failure only
/// moves the phase, and a payload rewrites phase, status line and whatever
/// metadata it actually carries.
fn reduce(current: &StationView, outcome: &FetchOutcome) -> StationView {
    let mut next = current.clone();

    match outcome {
        FetchOutcome::Asleep => {
            next.phase = StationPhase::Asleep;
            next.status_line = ASLEEP_STATUS_LINE.to_string();
        }
        FetchOutcome::Failed { message } => {
            next.phase = StationPhase::Error {
                message: message.clone(),
            };
        }
        FetchOutcome::Payload(payload) => {
            if let Some(name) = payload.display_title() {
                next.station_name = Some(name.to_string());
            }
            if let Some(color) = payload.color.as_deref().and_then(StationColor::parse) {
                next.color = Some(color);
            }
            if let Some(title) = payload.song_title() {
                next.now_playing = Some(title.to_string());
            }
            next.status_line = payload.status_line();
            next.phase = classify_payload(payload);
        }
    }

    if next.phase.is_on_air() {
        next.waking = false;
    }

    next
}

/// Derives the phase from a status payload.
fn classify_payload(payload: &StationStatus) -> StationPhase {
    match payload.server_status() {
        Some(status) if status.is_on_air() => {
            if payload.is_waiting_for_curator() {
                StationPhase::WaitingForCurator
            } else {
                StationPhase::Broadcasting
            }
        }
        Some(ServerStatus::WarmingUp) => StationPhase::WarmingUp,
        Some(_) => {
            let raw = payload.current_status.as_deref().unwrap_or_default();
            StationPhase::Error {
                message: format!("Station reported: {}.", humanize_status(raw.trim())),
            }
        }
        None => StationPhase::Error {
            message: "Station status unavailable.".to_string(),
        },
    }
}
