//! Errors raised while locating, reading and writing the config file

use crate::validation::ValidationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No per-user config directory exists on this platform
    #[error("Cannot locate a config directory for the current user")]
    NoConfigDir,

    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The file exists but holds nothing but whitespace
    #[error("{} is empty; delete it or run `radiosync config init`", path.display())]
    Empty { path: PathBuf },

    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Refused to write a config that would not pass validation
    #[error("Invalid config: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Cannot encode config: {0}")]
    Encode(#[source] toml::ser::Error),

    #[error("Cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
