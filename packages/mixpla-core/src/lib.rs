//! Mixpla Core - shared library for the Mixpla radio player.
//!
//! This crate provides the core functionality for Mixpla, an HLS web-radio
//! player: station status polling, wake-up orchestration and playback
//! recovery. It is designed to be used by both a headless console player
//! and richer UI shells that bring their own playback engine.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`runtime`]: Task spawning abstraction for async runtime independence
//! - [`events`]: Event system for real-time client communication
//! - [`context`]: Backend base URL handling and endpoint building
//! - [`auth`]: Bearer token caching and refresh
//! - [`state`]: Configuration and persisted player preferences
//! - [`station`]: Backend client, station directory and observable station state
//! - [`services`]: Status polling and directory refresh loops
//! - [`player`]: Playback engine seam and error recovery
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The crate defines several traits to decouple core logic from
//! platform-specific implementations:
//!
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning background tasks
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events
//! - [`RadioClient`](station::RadioClient): Backend access (status, directory, wake-up)
//! - [`PlaybackEngine`](player::PlaybackEngine): Driving the actual audio pipeline
//!
//! Each trait has a default implementation suitable for headless use.
//! Embedding apps provide their own where needed.

#![warn(clippy::all)]

pub mod auth;
pub mod bootstrap;
pub mod context;
pub mod error;
pub mod events;
pub mod player;
pub mod protocol_constants;
pub mod runtime;
pub mod services;
pub mod state;
pub mod station;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use context::ApiContext;
pub use error::{ErrorCode, MixplaError, MixplaResult, StatusResult, WakeResult};
pub use events::{
    AuthEvent, BroadcastEvent, BroadcastEventBridge, DirectoryEvent, EventEmitter,
    LoggingEventEmitter, NoopEventEmitter, PlayerEvent, StationEvent,
};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use state::{Config, PlayerPrefs, RecoveryConfig, Theme};
pub use utils::{now_millis, validate_station_slug, SlugValidationError};

// Re-export auth types
pub use auth::{AuthError, BearerToken, StaticTokenSource, TokenManager, TokenSource};

// Re-export station types
pub use station::{
    FetchOutcome, RadioClient, RadioHttpClient, ServerStatus, StationColor, StationDirectory,
    StationPhase, StationStatus, StationStore, StationSummary, StationView,
};

// Re-export service types
pub use services::{DirectoryMonitor, PollMode, StatusMonitor};

// Re-export player types
pub use player::{
    EngineErrorKind, EngineEvent, NullEngine, PlaybackCoordinator, PlaybackEngine, PlayerPhase,
    SegmentStats, SegmentStatsSnapshot,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, bootstrap_services_with_engine, RadioServices};
