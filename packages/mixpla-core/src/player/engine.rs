//! Playback engine abstraction.
//!
//! The coordinator drives playback through [`PlaybackEngine`] and reacts to
//! [`EngineEvent`]s the engine feeds back. Engines wrap whatever actually
//! renders audio (an embedded HLS pipeline, a remote-controlled player, or
//! nothing at all for headless runs).

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by playback engine commands.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected or failed to execute a command.
    #[error("Engine command failed: {0}")]
    Command(String),
}

/// Convenient Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Coarse classification of a fatal engine error.
///
/// Network errors are retried with backoff, media errors get one in-place
/// recovery attempt, anything else fails playback outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

/// Events fed from the engine into the playback coordinator.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The stream manifest was fetched and parsed.
    ManifestParsed,
    /// A quality level playlist loaded; may carry an in-band title.
    LevelLoaded { title: Option<String> },
    /// Playback moved to a new fragment; may carry an in-band title.
    FragmentChanged { title: Option<String> },
    /// A media fragment finished downloading.
    FragmentLoaded {
        url: String,
        load_time_ms: u64,
        bytes: u64,
    },
    /// A media fragment failed to download.
    FragmentLoadFailed {
        url: String,
        message: String,
        status: Option<u16>,
    },
    /// The engine is rendering audio.
    Playing,
    /// The engine was paused.
    Paused,
    /// The engine is waiting for data.
    Waiting,
    /// The stream ended.
    Ended,
    /// Playback stalled on an empty buffer.
    Stalled,
    /// The engine hit a fatal error and stopped on its own.
    Fatal {
        kind: EngineErrorKind,
        message: String,
    },
}

/// Abstraction over playback engine control operations.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Points the engine at a stream URL and begins loading it.
    async fn load_source(&self, url: &str) -> EngineResult<()>;

    /// Restarts loading of the current source without changing it.
    async fn start_load(&self) -> EngineResult<()>;

    /// Attempts in-place recovery from a fatal media error.
    async fn recover_media_error(&self) -> EngineResult<()>;

    /// Stops playback and releases the source.
    async fn stop(&self) -> EngineResult<()>;
}

/// Engine stub for headless runs. Accepts every command and renders nothing.
#[derive(Debug, Default)]
pub struct NullEngine;

#[async_trait]
impl PlaybackEngine for NullEngine {
    async fn load_source(&self, url: &str) -> EngineResult<()> {
        log::debug!("[NullEngine] load_source {}", url);
        Ok(())
    }

    async fn start_load(&self) -> EngineResult<()> {
        log::debug!("[NullEngine] start_load");
        Ok(())
    }

    async fn recover_media_error(&self) -> EngineResult<()> {
        log::debug!("[NullEngine] recover_media_error");
        Ok(())
    }

    async fn stop(&self) -> EngineResult<()> {
        log::debug!("[NullEngine] stop");
        Ok(())
    }
}
