//! Backend endpoint context for the radio API.
//!
//! This module provides [`ApiContext`] which bundles the backend base URL
//! and builds the per-station endpoint URLs used across services.

use crate::protocol_constants::{
    DEFAULT_BASE_URL, STATIONS_PATH, STATUS_PATH_SUFFIX, STREAM_PATH_SUFFIX, WAKEUP_PATH_SUFFIX,
};

/// Backend endpoint configuration shared across services.
///
/// All per-station endpoints hang off `/{slug}/radio/...`; the directory
/// endpoint is station-independent. Slugs are validated before they reach
/// this type (see [`crate::utils::validate_station_slug`]), so URL building
/// here is plain string formatting.
#[derive(Debug, Clone)]
pub struct ApiContext {
    base_url: String,
}

impl ApiContext {
    /// Creates a context for the given backend base URL.
    ///
    /// Trailing slashes are trimmed so path joins stay predictable.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Returns the backend base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the station directory endpoint.
    #[must_use]
    pub fn stations_url(&self) -> String {
        format!("{}{}", self.base_url, STATIONS_PATH)
    }

    /// Returns the status endpoint for a station.
    #[must_use]
    pub fn status_url(&self, slug: &str) -> String {
        format!("{}/{}{}", self.base_url, slug, STATUS_PATH_SUFFIX)
    }

    /// Returns the wake-up endpoint for a station.
    #[must_use]
    pub fn wakeup_url(&self, slug: &str) -> String {
        format!("{}/{}{}", self.base_url, slug, WAKEUP_PATH_SUFFIX)
    }

    /// Returns the HLS manifest URL for a station's stream.
    #[must_use]
    pub fn stream_url(&self, slug: &str) -> String {
        format!("{}/{}{}", self.base_url, slug, STREAM_PATH_SUFFIX)
    }
}

impl Default for ApiContext {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_station_endpoints() {
        let ctx = ApiContext::new("https://radio.example");
        assert_eq!(ctx.stations_url(), "https://radio.example/radio/stations");
        assert_eq!(
            ctx.status_url("bratan"),
            "https://radio.example/bratan/radio/status"
        );
        assert_eq!(
            ctx.wakeup_url("bratan"),
            "https://radio.example/bratan/radio/wakeup"
        );
        assert_eq!(
            ctx.stream_url("bratan"),
            "https://radio.example/bratan/radio/stream.m3u8"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let ctx = ApiContext::new("https://radio.example//");
        assert_eq!(ctx.base_url(), "https://radio.example");
        assert_eq!(ctx.stations_url(), "https://radio.example/radio/stations");
    }

    #[test]
    fn default_points_at_production_backend() {
        let ctx = ApiContext::default();
        assert_eq!(ctx.base_url(), DEFAULT_BASE_URL);
    }
}
