//! Radiosync Configuration System
//!
//! Layered configuration for the sync server: built-in defaults, a TOML file
//! in the platform config directory, then `RADIOSYNC_*` environment
//! variables. Command line flags are applied on top by the binary.
//!
//! Each section implements the `ConfigSection` trait, which validates and
//! merges it.
//!
//! # Example
//!
//! ```rust
//! use radiosync_config::{Config, ConfigManager};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! assert_eq!(config.sync.interval_minutes, 5);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
pub mod radio_config;
pub mod spotify_config;
pub mod sync_config;

pub use error::{ConfigError, ConfigResult};
pub use manager::{apply_env_overrides, ConfigManager};
pub use validation::{ConfigSection, ValidationError, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use radio_config::RadioConfig;
pub use spotify_config::SpotifyConfig;
pub use sync_config::SyncConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    pub app: AppConfig,

    pub radio: RadioConfig,

    pub spotify: SpotifyConfig,

    pub sync: SyncConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.radio.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.spotify.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.sync.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.radio.merge(other.radio);
        self.spotify.merge(other.spotify);
        self.sync.merge(other.sync);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            radio: RadioConfig::default(),
            spotify: SpotifyConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}
