//! Application configuration.
//!
//! [`AppConfig`] carries everything the window controllers need to know about
//! the hosting application: its name (which also names the window slots), its
//! version, default window geometry, help URLs, an optional startup notice and
//! an optional static facility list.
//!
//! Configuration is built in code or loaded from TOML:
//!
//! ```toml
//! app_name = "CueCommander"
//! app_version = "1.4.0"
//!
//! [urls]
//! user_guide = "https://docs.example.com/guide"
//!
//! [facilities]
//! names = ["local", "cloud"]
//! default = "local"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::window::{FacilityConfig, WindowGeometry};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`AppConfig`].
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The application name cannot be used to derive slot names.
    #[error("application name must not be empty")]
    EmptyAppName,
}

/// Help menu destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HelpUrls {
    /// Online user guide.
    pub user_guide: String,
    /// Suggestion form.
    pub suggestion: String,
    /// Bug tracker.
    pub bug: String,
}

/// A notice shown once to users who have not seen it since `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupNotice {
    /// Unix timestamp; users whose `LastNotice` is older see the notice.
    pub date: i64,
    /// The notice text.
    pub message: String,
}

/// Configuration of the hosting application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name; the first window slot carries this name.
    pub app_name: String,
    /// Application version, persisted as `Version` on every save.
    pub app_version: String,
    /// Geometry used when a slot has no saved geometry.
    pub default_geometry: WindowGeometry,
    /// Minimum window size (width, height).
    pub minimum_size: (u32, u32),
    /// Display duration for status messages, in milliseconds.
    pub status_duration_ms: u32,
    /// Help menu destinations.
    pub urls: HelpUrls,
    /// Optional startup notice.
    pub startup_notice: Option<StartupNotice>,
    /// Optional static facility list, used by [`crate::window::StaticFacilities`].
    pub facilities: Option<FacilityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "CueView".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            default_geometry: WindowGeometry::default(),
            minimum_size: (600, 400),
            status_duration_ms: cueview_core::StatusMessage::DEFAULT_DURATION_MS,
            urls: HelpUrls::default(),
            startup_notice: None,
            facilities: None,
        }
    }
}

impl AppConfig {
    /// Create a configuration for the named application.
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            ..Self::default()
        }
    }

    /// Set the help menu destinations.
    pub fn with_urls(mut self, urls: HelpUrls) -> Self {
        self.urls = urls;
        self
    }

    /// Set the startup notice.
    pub fn with_startup_notice(mut self, notice: StartupNotice) -> Self {
        self.startup_notice = Some(notice);
        self
    }

    /// Set a static facility list.
    pub fn with_facilities(mut self, facilities: FacilityConfig) -> Self {
        self.facilities = Some(facilities);
        self
    }

    /// Load configuration from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::EmptyAppName);
        }
        Ok(())
    }
}
