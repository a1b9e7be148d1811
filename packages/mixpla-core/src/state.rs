//! Core configuration and persisted player preferences.
//!
//! This module provides [`Config`], the tunable knobs for polling, recovery
//! and auth behavior, and [`PlayerPrefs`], the small preference file that
//! survives restarts (last station, theme, reduced motion).

use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_BASE_URL, DIRECTORY_REFRESH_INTERVAL_MS, EVENT_CHANNEL_CAPACITY,
    FAST_POLL_INTERVAL_MS, HTTP_TIMEOUT_SECS, MAX_STREAM_RETRIES, REGULAR_POLL_INTERVAL_MS,
    RETRY_BASE_DELAY_MS, TOKEN_MIN_VALIDITY_SECS, WARMUP_GUARD_MS,
};

/// Configuration for stream failure recovery.
///
/// Groups the retry parameters that control how aggressively a dropped
/// stream is reloaded before the player gives up.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of scheduled stream reloads before giving up.
    pub max_retries: u32,

    /// Base delay between reloads (milliseconds); attempt `n` waits `n * base`.
    pub base_delay_ms: u64,
}

impl RecoveryConfig {
    /// Creates a new `RecoveryConfig` with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if any value would cause runtime issues.
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Result<Self, String> {
        let config = Self {
            max_retries,
            base_delay_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be >= 1".to_string());
        }
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_STREAM_RETRIES,
            base_delay_ms: RETRY_BASE_DELAY_MS,
        }
    }
}

/// Configuration for the Mixpla player core.
///
/// All fields have sensible defaults matching the production backend.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    // Backend
    /// Base URL of the radio backend.
    pub base_url: String,

    /// Bearer token for authenticated backends (none = anonymous access).
    pub auth_token: Option<String>,

    // Polling
    /// Steady-state status poll interval (milliseconds).
    pub regular_interval_ms: u64,

    /// Accelerated status poll interval while waiting for a station to come
    /// on air (milliseconds).
    pub fast_interval_ms: u64,

    /// Station directory refresh interval (milliseconds).
    pub directory_interval_ms: u64,

    /// How long a wake-up may stay unanswered before the waking indicator
    /// is cleared (milliseconds).
    pub warmup_guard_ms: u64,

    // Playback recovery
    /// Stream reload behavior after network failures.
    #[serde(default)]
    pub recovery: RecoveryConfig,

    // Auth
    /// Minimum remaining token validity before a refresh is forced (seconds).
    pub token_min_validity_secs: u64,

    // HTTP
    /// Timeout for backend HTTP requests (seconds).
    pub http_timeout_secs: u64,

    // Events
    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("base_url must start with http:// or https://".to_string());
        }
        if self.regular_interval_ms == 0 || self.fast_interval_ms == 0 {
            return Err("poll intervals must be >= 1 ms".to_string());
        }
        if self.fast_interval_ms > self.regular_interval_ms {
            return Err("fast_interval_ms must not exceed regular_interval_ms".to_string());
        }
        if self.directory_interval_ms == 0 {
            return Err("directory_interval_ms must be >= 1 ms".to_string());
        }
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be >= 1".to_string());
        }
        if self.event_channel_capacity == 0 {
            return Err(
                "event_channel_capacity must be >= 1 (broadcast::channel panics on 0)".to_string(),
            );
        }
        self.recovery.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            regular_interval_ms: REGULAR_POLL_INTERVAL_MS,
            fast_interval_ms: FAST_POLL_INTERVAL_MS,
            directory_interval_ms: DIRECTORY_REFRESH_INTERVAL_MS,
            warmup_guard_ms: WARMUP_GUARD_MS,
            recovery: RecoveryConfig::default(),
            token_min_validity_secs: TOKEN_MIN_VALIDITY_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            event_channel_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Player Preferences (persisted)
// ─────────────────────────────────────────────────────────────────────────────

const PREFS_FILE: &str = "player_prefs.json";

/// Global mutex to serialize all preference file operations.
/// Prevents race conditions from concurrent preference updates.
static PREFS_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn prefs_lock() -> &'static Mutex<()> {
    PREFS_LOCK.get_or_init(|| Mutex::new(()))
}

/// UI color theme.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (startup default).
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

/// Persisted player preferences.
///
/// Restored at startup so the player reopens on the station and theme the
/// user last used.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerPrefs {
    /// Slug of the last selected station.
    pub last_station: Option<String>,
    /// UI color theme.
    pub theme: Theme,
    /// Disable UI animations.
    pub reduced_motion: bool,
}

impl PlayerPrefs {
    /// Loads preferences from the app data directory.
    ///
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load(app_data_dir: &std::path::Path) -> Self {
        let path = app_data_dir.join(PREFS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Saves preferences to the app data directory.
    ///
    /// Uses atomic write (temp file + rename) to prevent corruption on crash.
    /// Creates the directory if it doesn't exist.
    pub fn save(&self, app_data_dir: &std::path::Path) -> std::io::Result<()> {
        std::fs::create_dir_all(app_data_dir)?;
        let path = app_data_dir.join(PREFS_FILE);
        let temp_path = app_data_dir.join("player_prefs.json.tmp");
        let contents = serde_json::to_string_pretty(self)?;

        // Write to temp file first
        std::fs::write(&temp_path, contents)?;
        // Atomic rename (on most filesystems)
        std::fs::rename(&temp_path, &path)
    }

    /// Atomically records the last selected station.
    ///
    /// Acquires a lock, loads the file, updates the field, and saves.
    /// Writing the already-stored slug is a no-op (skips the disk write).
    pub fn set_last_station_atomic(
        app_data_dir: &std::path::Path,
        slug: &str,
    ) -> std::io::Result<()> {
        let _guard = prefs_lock().lock();
        let mut prefs = Self::load(app_data_dir);
        if prefs.last_station.as_deref() != Some(slug) {
            prefs.last_station = Some(slug.to_string());
            prefs.save(app_data_dir)?;
        }
        Ok(())
    }

    /// Atomically records the UI theme.
    pub fn set_theme_atomic(app_data_dir: &std::path::Path, theme: Theme) -> std::io::Result<()> {
        let _guard = prefs_lock().lock();
        let mut prefs = Self::load(app_data_dir);
        if prefs.theme != theme {
            prefs.theme = theme;
            prefs.save(app_data_dir)?;
        }
        Ok(())
    }

    /// Atomically records the reduced motion preference.
    pub fn set_reduced_motion_atomic(
        app_data_dir: &std::path::Path,
        reduced_motion: bool,
    ) -> std::io::Result<()> {
        let _guard = prefs_lock().lock();
        let mut prefs = Self::load(app_data_dir);
        if prefs.reduced_motion != reduced_motion {
            prefs.reduced_motion = reduced_motion;
            prefs.save(app_data_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.regular_interval_ms, 15_000);
        assert_eq!(config.fast_interval_ms, 5_000);
        assert_eq!(config.recovery.max_retries, 3);
        assert_eq!(config.recovery.base_delay_ms, 2_000);
    }

    #[test]
    fn config_rejects_inverted_cadences() {
        let mut config = Config::default();
        config.fast_interval_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_schemeless_base_url() {
        let mut config = Config::default();
        config.base_url = "bratan.online".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn recovery_config_rejects_zero_values() {
        assert!(RecoveryConfig::new(0, 2_000).is_err());
        assert!(RecoveryConfig::new(3, 0).is_err());
        assert!(RecoveryConfig::new(3, 2_000).is_ok());
    }

    #[test]
    fn prefs_load_returns_defaults_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = PlayerPrefs::load(dir.path());
        assert_eq!(prefs, PlayerPrefs::default());
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn prefs_survive_a_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = PlayerPrefs {
            last_station: Some("bratan".to_string()),
            theme: Theme::Dark,
            reduced_motion: true,
        };
        prefs.save(dir.path()).unwrap();
        assert_eq!(PlayerPrefs::load(dir.path()), prefs);
    }

    #[test]
    fn corrupted_prefs_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PREFS_FILE), "not json at all").unwrap();
        assert_eq!(PlayerPrefs::load(dir.path()), PlayerPrefs::default());
    }

    #[test]
    fn atomic_setters_update_single_fields() {
        let dir = tempfile::tempdir().unwrap();
        PlayerPrefs::set_last_station_atomic(dir.path(), "bratan").unwrap();
        PlayerPrefs::set_theme_atomic(dir.path(), Theme::Dark).unwrap();
        PlayerPrefs::set_reduced_motion_atomic(dir.path(), true).unwrap();

        let prefs = PlayerPrefs::load(dir.path());
        assert_eq!(prefs.last_station.as_deref(), Some("bratan"));
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.reduced_motion);
    }
}
