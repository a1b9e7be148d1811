//! Radio station state, backend access and classification.
//!
//! This module owns everything station-shaped: talking to the backend REST
//! API, interpreting its payloads, and maintaining the derived view of the
//! currently selected station.
//!
//! # Module Structure
//!
//! - `types` - Wire payloads and derived domain types
//! - `traits` - Trait abstractions for testability
//! - `client` - `RadioHttpClient` concrete trait implementation
//! - `store` - Watch-channel store for the selected station's view
//! - `directory` - Concurrent registry of known stations

pub mod client;
pub mod directory;
pub mod store;
pub mod traits;
pub mod types;

// Re-export domain types
pub use types::{
    FetchOutcome, ServerStatus, StationColor, StationPhase, StationStatus, StationSummary,
};

// Re-export trait abstractions
pub use traits::{RadioClient, StationControl, StationDirectorySource, StationStatusSource};

// Re-export concrete implementation and stores
pub use client::RadioHttpClient;
pub use directory::StationDirectory;
pub use store::{StationStore, StationUpdate, StationView};
