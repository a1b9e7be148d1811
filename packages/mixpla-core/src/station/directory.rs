//! In-memory directory of known stations.
//!
//! The directory is a concurrent map refreshed wholesale by the directory
//! monitor. Readers (station pickers, slug validation at the service edge)
//! see the last successful refresh; a failed refresh never clears it.

use dashmap::DashMap;

use super::types::StationSummary;

/// Concurrent registry of the stations the backend advertises.
#[derive(Default)]
pub struct StationDirectory {
    stations: DashMap<String, StationSummary>,
}

impl StationDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the directory contents with a fresh station list.
    ///
    /// Entries are upserted by slug and entries missing from `stations` are
    /// removed. Entries without a slug cannot be routed to and are skipped.
    pub fn replace_all(&self, stations: Vec<StationSummary>) {
        let mut seen: Vec<String> = Vec::with_capacity(stations.len());
        for station in stations {
            if station.slug_name.is_empty() {
                log::warn!(
                    "[StationDirectory] Skipping entry without slug: {:?}",
                    station.name
                );
                continue;
            }
            seen.push(station.slug_name.clone());
            self.stations.insert(station.slug_name.clone(), station);
        }
        self.stations.retain(|slug, _| seen.iter().any(|s| s == slug));
    }

    /// Returns a station by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<StationSummary> {
        self.stations.get(slug).map(|entry| entry.value().clone())
    }

    /// Returns all stations sorted by slug.
    #[must_use]
    pub fn all(&self) -> Vec<StationSummary> {
        let mut stations: Vec<StationSummary> = self
            .stations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        stations.sort_by(|a, b| a.slug_name.cmp(&b.slug_name));
        stations
    }

    /// Returns the number of known stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if no stations are known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
