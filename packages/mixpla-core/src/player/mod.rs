//! Playback layer.
//!
//! This module contains the playback engine abstraction, the coordinator
//! that recovers it from errors, and rolling segment download statistics.

pub mod coordinator;
pub mod engine;
pub mod segment_stats;

pub use coordinator::{PlaybackCoordinator, PlayerPhase};
pub use engine::{EngineError, EngineErrorKind, EngineEvent, EngineResult, NullEngine, PlaybackEngine};
pub use segment_stats::{SegmentStats, SegmentStatsSnapshot};
