//! Reading and replacing `config.toml`
//!
//! A save never leaves a half-written file behind: the new contents land in
//! a temporary file next to the target and are renamed over it. The file
//! being replaced is copied to `config.toml.backup` first.

use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const COMMENTED_HEADER: &str = "\
# radiosync configuration
#
# [radio]  name/id may be set here instead of on the command line
# [sync]   interval_minutes is the fixed wait, also used when adaptive
#          scheduling cannot predict the next track change
#
# RADIOSYNC_SECTION_FIELD environment variables override these values.

";

/// The TOML file backing a [`Config`]
#[derive(Debug, Clone)]
pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Parses the file, or returns `None` if it has not been created yet
    ///
    /// Values are not validated here so a broken file can still be shown
    /// and repaired.
    pub fn read(&self) -> ConfigResult<Option<Config>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.path.clone(),
            });
        }

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Validates and writes `config`
    pub fn write(&self, config: &Config) -> ConfigResult<()> {
        let body = encode(config)?;
        self.replace(&body)
    }

    /// Like [`write`](Self::write), with a comment block explaining the sections
    pub fn write_commented(&self, config: &Config) -> ConfigResult<()> {
        let body = encode(config)?;
        self.replace(&format!("{}{}", COMMENTED_HEADER, body))
    }

    fn replace(&self, contents: &str) -> ConfigResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| write_error(dir, source))?;

        if self.exists() {
            let backup = self.path.with_extension("toml.backup");
            fs::copy(&self.path, &backup).map_err(|source| write_error(&backup, source))?;
            log::debug!("Previous config kept at {}", backup.display());
        }

        let mut staged = NamedTempFile::new_in(dir).map_err(|source| write_error(dir, source))?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|source| write_error(staged.path(), source))?;
        staged
            .persist(&self.path)
            .map_err(|e| write_error(&self.path, e.error))?;

        log::info!("Wrote {}", self.path.display());
        Ok(())
    }
}

fn encode(config: &Config) -> ConfigResult<String> {
    config.validate().map_err(ConfigError::Invalid)?;
    toml::to_string_pretty(config).map_err(ConfigError::Encode)
}

fn write_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file() -> (TempDir, ConfigFile) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = ConfigFile::new(dir.path().join("config.toml"));
        (dir, file)
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let (_dir, file) = config_file();
        assert!(file.read().expect("Should read").is_none());
    }

    #[test]
    fn test_written_config_reads_back() {
        let (_dir, file) = config_file();

        let mut config = Config::default();
        config.sync.cache_size = 250;
        config.radio.id = Some("p3".to_string());
        file.write(&config).expect("Should write");

        assert_eq!(file.read().expect("Should read"), Some(config));
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = ConfigFile::new(dir.path().join("nested").join("config.toml"));

        file.write(&Config::default()).expect("Should write");
        assert!(file.exists());
    }

    #[test]
    fn test_overwrite_keeps_previous_file() {
        let (_dir, file) = config_file();

        let mut config = Config::default();
        file.write(&config).expect("Should write");
        config.sync.adaptive = true;
        file.write(&config).expect("Should write again");

        let backup = fs::read_to_string(file.path().with_extension("toml.backup"))
            .expect("Backup should exist");
        assert!(backup.contains("adaptive = false"));
    }

    #[test]
    fn test_blank_file_is_empty_error() {
        let (_dir, file) = config_file();
        fs::write(file.path(), "  \n").expect("Should write file");

        assert!(matches!(file.read(), Err(ConfigError::Empty { .. })));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let (_dir, file) = config_file();
        fs::write(file.path(), "this is not valid TOML {{{").expect("Should write file");

        assert!(matches!(file.read(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_out_of_range_values_still_read() {
        let (_dir, file) = config_file();
        fs::write(file.path(), "[sync]\ncache_size = 0\n").expect("Should write file");

        let config = file.read().expect("Should read").expect("File exists");
        assert_eq!(config.sync.cache_size, 0);
    }

    #[test]
    fn test_invalid_config_is_not_written() {
        let (_dir, file) = config_file();

        let mut config = Config::default();
        config.sync.interval_minutes = 0;

        match file.write(&config) {
            Err(ConfigError::Invalid(errors)) => {
                assert_eq!(errors[0].field, "sync.interval_minutes")
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert!(!file.exists());
    }

    #[test]
    fn test_commented_default_reads_back() {
        let (_dir, file) = config_file();

        file.write_commented(&Config::default())
            .expect("Should write");

        let contents = fs::read_to_string(file.path()).expect("Should read file");
        assert!(contents.starts_with("# radiosync configuration"));
        assert_eq!(file.read().expect("Should read"), Some(Config::default()));
    }
}
