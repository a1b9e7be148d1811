//! Console configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Console configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the radio backend.
    /// Override: `MIXPLA_BASE_URL`
    pub base_url: String,

    /// Bearer token for authenticated backends.
    /// Override: `MIXPLA_AUTH_TOKEN`
    pub auth_token: Option<String>,

    /// Station to tune into on startup. Falls back to the persisted last
    /// station, then to the first directory entry.
    pub station: Option<String>,

    /// Interval in milliseconds between status polls.
    /// Override: `MIXPLA_POLL_INTERVAL_MS`
    pub regular_interval_ms: u64,

    /// Interval in milliseconds between directory refreshes.
    pub directory_interval_ms: u64,

    /// Directory for persistent data (player preferences).
    /// Override: `MIXPLA_DATA_DIR`
    pub data_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let core = mixpla_core::Config::default();
        Self {
            base_url: core.base_url,
            auth_token: None,
            station: None,
            regular_interval_ms: core.regular_interval_ms,
            directory_interval_ms: core.directory_interval_ms,
            data_dir: None,
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MIXPLA_BASE_URL") {
            if !val.trim().is_empty() {
                self.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("MIXPLA_AUTH_TOKEN") {
            if !val.trim().is_empty() {
                self.auth_token = Some(val);
            }
        }

        if let Ok(val) = std::env::var("MIXPLA_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.regular_interval_ms = interval;
            }
        }

        // Note: MIXPLA_STATION and MIXPLA_DATA_DIR are handled by clap via
        // #[arg(env = ...)] in main.rs
    }

    /// Converts to mixpla-core's Config type.
    pub fn to_core_config(&self) -> mixpla_core::Config {
        mixpla_core::Config {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            regular_interval_ms: self.regular_interval_ms,
            directory_interval_ms: self.directory_interval_ms,
            ..Default::default()
        }
    }
}
