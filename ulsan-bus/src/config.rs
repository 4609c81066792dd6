//! Platform configuration.
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "api_key": "...",
//!   "stations": [
//!     { "station_id": "196040234", "name": "삼호교",
//!       "update_time": [{ "start_time": "06:30", "end_time": "09:00" }] }
//!   ]
//! }
//! ```
//!
//! The API key can also come from the environment so it stays out of the file.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{ActiveWindow, DEFAULT_END_HOUR, DEFAULT_START_HOUR, StationId};
use crate::feed::{DEFAULT_BASE_URL, FeedConfig};

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "ULSAN_BUS_CONFIG";

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "ULSAN_BUS_API_KEY";

pub const DEFAULT_CONFIG_PATH: &str = "ulsan_bus.json";
pub const DEFAULT_STATION_NAME: &str = "삼호교";
pub const DEFAULT_ENTITY_PREFIX: &str = "ulsan_bus";

/// Errors from loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid JSON or has the wrong shape
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing API key: set api_key or ULSAN_BUS_API_KEY")]
    MissingApiKey,

    #[error("at least one station must be configured")]
    NoStations,

    #[error("station {0} is configured more than once")]
    DuplicateStation(StationId),

    #[error("invalid active hours {start}..{end}: need start < end <= 24")]
    InvalidHours { start: u32, end: u32 },

    #[error("scan interval must be at least one second")]
    InvalidScanInterval,
}

/// One configured station.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub station_id: StationId,

    /// Display name
    #[serde(default = "default_station_name")]
    pub name: String,

    /// Windows during which this station's sensors are live.
    /// Empty means always.
    #[serde(default)]
    pub update_time: Vec<ActiveWindow>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Open-data service key
    #[serde(default)]
    pub api_key: String,

    pub stations: Vec<StationConfig>,

    /// Feed endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix for produced entity ids
    #[serde(default = "default_entity_prefix")]
    pub entity_prefix: String,

    /// Feed active hours, both exclusive
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,

    /// How often the scheduler offers every sensor a refresh (seconds)
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Address for the HTTP server
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_station_name() -> String {
    DEFAULT_STATION_NAME.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_entity_prefix() -> String {
    DEFAULT_ENTITY_PREFIX.to_string()
}

fn default_start_hour() -> u32 {
    DEFAULT_START_HOUR
}

fn default_end_hour() -> u32 {
    DEFAULT_END_HOUR
}

fn default_scan_interval_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

impl BusConfig {
    /// Parse a configuration from JSON. Does not validate.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Load from the file named by [`CONFIG_PATH_ENV`], apply the
    /// [`API_KEY_ENV`] override, and validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load(path)?.with_api_key(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace the API key if `key` is set and non-empty.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    /// Check everything the platform relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if self.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(&station.station_id) {
                return Err(ConfigError::DuplicateStation(station.station_id.clone()));
            }
        }

        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(ConfigError::InvalidHours {
                start: self.start_hour,
                end: self.end_hour,
            });
        }

        if self.scan_interval_secs == 0 {
            return Err(ConfigError::InvalidScanInterval);
        }

        Ok(())
    }

    /// Feed client configuration for one station.
    pub fn feed_config(&self, station: &StationConfig) -> FeedConfig {
        FeedConfig::new(self.api_key.clone(), station.station_id.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout_secs)
            .with_active_hours(self.start_hour, self.end_hour)
    }

    /// Returns the scan interval as a Duration.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}
