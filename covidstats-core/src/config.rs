//! TOML configuration with defaults for every field.
//!
//! ```toml
//! cache_dir = "/home/me/.cache/covidstats"
//! base_url = "https://tirania.org/covid-data/"
//! dataset = "global.json"
//! freshness_hours = 24
//! request_timeout_secs = 30
//! locations = "Massachusetts,California,Mexico"
//! ```

use crate::data::DEFAULT_BASE_URL;
use crate::error::StatError;
use crate::source::DEFAULT_FRESHNESS_HOURS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Saved location list used when nothing else is configured.
pub const DEFAULT_LOCATIONS: &str = "Massachusetts,California,Mexico,25021.0,25025.0,Vermont";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovidConfig {
    /// Directory holding one cached envelope per location.
    pub cache_dir: PathBuf,
    /// Snapshot service; the location code is appended.
    pub base_url: String,
    /// Reference dataset mapping codes to locations.
    pub dataset: PathBuf,
    pub freshness_hours: i64,
    pub request_timeout_secs: u64,
    /// Comma-separated saved location list, in display order.
    pub locations: String,
}

impl Default for CovidConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dataset: PathBuf::from("global.json"),
            freshness_hours: DEFAULT_FRESHNESS_HOURS,
            request_timeout_secs: 30,
            locations: DEFAULT_LOCATIONS.to_string(),
        }
    }
}

impl CovidConfig {
    /// Parse from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, StatError> {
        toml::from_str(content).map_err(|e| StatError::Config(format!("parse config TOML: {e}")))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, StatError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(StatError::Config(format!("read {}: {e}", path.display()))),
        }
    }

    pub fn to_toml(&self) -> Result<String, StatError> {
        toml::to_string_pretty(self).map_err(|e| StatError::Config(format!("serialize config: {e}")))
    }

    /// Freshness window; hour counts beyond chrono's range clamp to its bounds.
    pub fn freshness(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.freshness_hours).unwrap_or(if self.freshness_hours < 0 {
            chrono::Duration::MIN
        } else {
            chrono::Duration::MAX
        })
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Platform cache directory, or `./cache` when there is none.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("covidstats"))
        .unwrap_or_else(|| PathBuf::from("cache"))
}

/// Platform config file location, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("covidstats").join("config.toml"))
}
