//! Trait abstractions for radio backend operations.
//!
//! These traits enable dependency injection for testability and modularity.
//! Services depend on traits rather than concrete implementations.

use async_trait::async_trait;

use super::client::{StatusResult, WakeResult};
use super::types::{StationStatus, StationSummary};

/// Trait for fetching a single station's broadcast status.
///
/// Used by `StatusMonitor` on every polling tick.
#[async_trait]
pub trait StationStatusSource: Send + Sync {
    /// Fetches the current status payload for a station.
    ///
    /// # Arguments
    /// * `slug` - URL-safe station identifier
    async fn fetch_status(&self, slug: &str) -> StatusResult<StationStatus>;
}

/// Trait for listing the station directory.
///
/// Used by `DirectoryMonitor` on its refresh cadence.
#[async_trait]
pub trait StationDirectorySource: Send + Sync {
    /// Fetches the full list of known stations.
    async fn fetch_stations(&self) -> StatusResult<Vec<StationSummary>>;
}

/// Trait for waking an asleep station.
///
/// Used by `StatusMonitor` to kick a station's stream pipeline awake before
/// switching to fast polling.
#[async_trait]
pub trait StationWakeControl: Send + Sync {
    /// Requests that the backend start a station's stream pipeline.
    ///
    /// Returns once the backend has accepted the request; the station then
    /// warms up asynchronously and reports progress via its status endpoint.
    ///
    /// # Arguments
    /// * `slug` - URL-safe station identifier
    async fn wake(&self, slug: &str) -> WakeResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for per-station monitoring operations.
///
/// Used by `StatusMonitor`, which both polls status and issues wake-ups.
#[async_trait]
pub trait StationControl: StationStatusSource + StationWakeControl {}

/// Blanket implementation for any type implementing both traits.
impl<T: StationStatusSource + StationWakeControl> StationControl for T {}

/// Combined trait for all radio backend operations.
///
/// Used by the service bundle to provide a unified client.
#[async_trait]
pub trait RadioClient: StationStatusSource + StationDirectorySource + StationWakeControl {}

/// Blanket implementation for any type implementing all traits.
impl<T: StationStatusSource + StationDirectorySource + StationWakeControl> RadioClient for T {}
