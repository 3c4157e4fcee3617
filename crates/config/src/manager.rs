//! Configuration manager - main API for config operations

use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult, ValidationError, CONFIG_VERSION};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "RADIOSYNC";

/// Main configuration manager
///
/// Resolves the config file location and loads, saves and validates it.
pub struct ConfigManager {
    file: ConfigFile,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/radiosync/`
    /// - macOS: `~/Library/Application Support/radiosync/`
    /// - Windows: `%APPDATA%\radiosync\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        Ok(Self {
            file: ConfigFile::new(config_dir.join("config.toml")),
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "radiosync")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Loads the configuration from file
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// is an error. Out-of-range values and a version mismatch are only
    /// logged so the file can still be inspected and fixed.
    pub fn load(&self) -> ConfigResult<Config> {
        let Some(config) = self.file.read()? else {
            log::info!(
                "No config file at {}, using defaults",
                self.file.path().display()
            );
            return Ok(Config::default());
        };

        if config.version != CONFIG_VERSION {
            log::warn!(
                "Config version {} differs from supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        if let Err(errors) = config.validate() {
            warn_invalid("Config file has invalid values", &errors);
        }

        Ok(config)
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Loads, modifies and saves the configuration
    ///
    /// ```rust,no_run
    /// # use radiosync_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.sync.adaptive = true;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            log::info!("Config file already exists at {}", self.file.path().display());
            return Ok(false);
        }

        self.file.write_commented(&Config::default())?;
        Ok(true)
    }

    /// Overwrites the config file with default values
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the file and applies `RADIOSYNC_SECTION_FIELD` environment overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            warn_invalid("Environment overrides left invalid values", &errors);
        }

        Ok(config)
    }
}

fn warn_invalid(context: &str, errors: &[ValidationError]) {
    for error in errors {
        log::warn!("{}: {}", context, error);
    }
}

/// Applies overrides read through `lookup`
///
/// Unparseable values are logged and leave the field unchanged.
pub fn apply_env_overrides<L>(config: &mut Config, lookup: L)
where
    L: Fn(&str) -> Option<String>,
{
    let var = |field: &str| {
        let key = format!("{}_{}", ENV_PREFIX, field);
        lookup(&key).map(|value| (key, value))
    };

    if let Some((key, value)) = var("SYNC_INTERVAL_MINUTES") {
        override_parsed(&key, &value, &mut config.sync.interval_minutes);
    }
    if let Some((key, value)) = var("SYNC_CACHE_SIZE") {
        override_parsed(&key, &value, &mut config.sync.cache_size);
    }
    if let Some((key, value)) = var("SYNC_ADAPTIVE") {
        override_parsed(&key, &value, &mut config.sync.adaptive);
    }
    if let Some((key, value)) = var("SYNC_DELETE_EVICTED") {
        override_parsed(&key, &value, &mut config.sync.delete_evicted);
    }
    if let Some((key, value)) = var("APP_LOG_LEVEL") {
        override_parsed(&key, &value, &mut config.app.log_level);
    }
    if let Some((_, value)) = var("SPOTIFY_TOKEN_FILE") {
        config.spotify.token_file = PathBuf::from(value);
    }
}

fn override_parsed<T: FromStr>(key: &str, value: &str, field: &mut T) {
    match value.trim().parse() {
        Ok(parsed) => *field = parsed,
        Err(_) => log::warn!("Ignoring {}={:?}: not a valid value", key, value),
    }
}
