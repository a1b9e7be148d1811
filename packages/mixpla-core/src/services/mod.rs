//! Background services layer.
//!
//! This module contains the long-running services that orchestrate between
//! the HTTP client (station/) and the playback layer (player/).

pub mod directory_monitor;
pub mod polling;
pub mod status_monitor;

pub use directory_monitor::DirectoryMonitor;
pub use polling::{PollMode, PollingHandle};
pub use status_monitor::StatusMonitor;
