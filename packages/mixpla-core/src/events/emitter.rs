//! Event emitter abstraction for decoupling services from transport.
//!
//! Services depend on the [`EventEmitter`] trait rather than concrete broadcast
//! channels, enabling testing and alternative transport implementations.

use super::{AuthEvent, DirectoryEvent, PlayerEvent, StationEvent};

/// Trait for emitting domain events without knowledge of transport.
///
/// Services use this trait to emit events, decoupling them from the
/// specifics of how events reach subscribers (broadcast channel, console
/// printer, UI frontend, etc.).
pub trait EventEmitter: Send + Sync {
    /// Emits a station broadcast-state event.
    fn emit_station(&self, event: StationEvent);

    /// Emits a playback engine event.
    fn emit_player(&self, event: PlayerEvent);

    /// Emits a station directory event.
    fn emit_directory(&self, event: DirectoryEvent);

    /// Emits an authentication event.
    fn emit_auth(&self, event: AuthEvent);
}

/// No-op emitter for tests or embedders that only consume state snapshots.
///
/// Events are silently discarded. State watchers still see every change via
/// the station store, so dropping events loses nothing but the notifications.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_station(&self, _event: StationEvent) {
        // No-op: state is still observable via the station store
    }

    fn emit_player(&self, _event: PlayerEvent) {
        // No-op
    }

    fn emit_directory(&self, _event: DirectoryEvent) {
        // No-op
    }

    fn emit_auth(&self, _event: AuthEvent) {
        // No-op
    }
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level. Useful for debugging event flow
/// or in development environments.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_station(&self, event: StationEvent) {
        tracing::debug!(?event, "station_event");
    }

    fn emit_player(&self, event: PlayerEvent) {
        tracing::debug!(?event, "player_event");
    }

    fn emit_directory(&self, event: DirectoryEvent) {
        tracing::debug!(?event, "directory_event");
    }

    fn emit_auth(&self, event: AuthEvent) {
        tracing::debug!(?event, "auth_event");
    }
}
