//! Event system for real-time player state notifications.
//!
//! This module provides:
//! - [`EventEmitter`] trait for domain services to emit events
//! - [`BroadcastEventBridge`] for fan-out to UI subscribers
//! - Event types for the station, player, directory and auth domains

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::player::PlayerPhase;
use crate::station::{StationPhase, StationSummary};

/// Events broadcast to subscribers.
///
/// This enum categorizes all real-time events the player core can surface.
/// Each category has its own inner event type with specific variants.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// Events describing a single station's broadcast state.
    Station(StationEvent),

    /// Events from the playback engine and its recovery logic.
    Player(PlayerEvent),

    /// Events describing the station directory.
    Directory(DirectoryEvent),

    /// Events describing authentication state.
    Auth(AuthEvent),
}

/// Events describing a station's observed broadcast state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StationEvent {
    /// The station's derived phase changed.
    PhaseChanged {
        /// Slug of the station this event is about.
        slug: String,
        /// The new phase.
        phase: StationPhase,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The now-playing title changed.
    NowPlayingChanged {
        /// Slug of the station this event is about.
        slug: String,
        /// The new track title.
        title: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A wake-up request was sent to the backend.
    WakeRequested {
        /// Slug of the station being woken.
        slug: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A wake-up request failed.
    WakeFailed {
        /// Slug of the station that failed to wake.
        slug: String,
        /// Error message describing the failure.
        error: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A woken station did not report awake within the warm-up guard window.
    WarmupTimedOut {
        /// Slug of the station that timed out.
        slug: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// Status polling for a station was stopped.
    PollingStopped {
        /// Slug of the station no longer being polled.
        slug: String,
        /// Why polling stopped (`stationAsleep`, `authenticationRequired`).
        reason: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Events from the playback engine and its recovery state machine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Playback phase changed.
    PhaseChanged {
        /// The new playback phase.
        phase: PlayerPhase,
        /// Human-readable detail (present for failures).
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The stream manifest was parsed successfully.
    ManifestLoaded {
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The engine surfaced an in-band track title.
    TrackTitle {
        /// The track title.
        title: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A stream reload was scheduled after a network failure.
    RecoveryScheduled {
        /// Retry attempt number (1-based).
        attempt: u32,
        /// Delay before the reload runs.
        #[serde(rename = "delayMs")]
        delay_ms: u64,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// All retry attempts were spent without restoring playback.
    RecoveryExhausted {
        /// Error message from the final failed attempt.
        message: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The one-shot media error recovery was invoked.
    MediaRecovery {
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A load restart was issued to nudge a stalled or interrupted stream.
    StallRecovery {
        /// What prompted the restart (`bufferStalled`, `connectivityRestored`).
        trigger: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Events describing the station directory.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectoryEvent {
    /// The station list was refreshed.
    Updated {
        /// The refreshed station list.
        stations: Vec<StationSummary>,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Events describing authentication state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthEvent {
    /// The backend rejected the player's credentials.
    LoginRequired {
        /// Human-readable reason for the rejection.
        reason: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

// From implementations for converting inner events to BroadcastEvent
impl From<StationEvent> for BroadcastEvent {
    fn from(event: StationEvent) -> Self {
        BroadcastEvent::Station(event)
    }
}

impl From<PlayerEvent> for BroadcastEvent {
    fn from(event: PlayerEvent) -> Self {
        BroadcastEvent::Player(event)
    }
}

impl From<DirectoryEvent> for BroadcastEvent {
    fn from(event: DirectoryEvent) -> Self {
        BroadcastEvent::Directory(event)
    }
}

impl From<AuthEvent> for BroadcastEvent {
    fn from(event: AuthEvent) -> Self {
        BroadcastEvent::Auth(event)
    }
}
