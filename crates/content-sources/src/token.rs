// crates/content-sources/src/token.rs
//! Spotify OAuth token file

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Application credentials used to refresh the access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_file: String,
}

/// The Spotify user the token belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uri: String,
    /// Fields the sync does not use, preserved across saves
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Contents of the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    pub refresh_token: String,
    pub auth: Credentials,
    #[serde(default)]
    pub profile: Profile,
}

/// Body of a successful refresh response
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshedToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    /// Only present when the service rotates refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Token {
    /// Reads a token file
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ClientError::TokenIo {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&data).map_err(|source| ClientError::TokenFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the token file atomically, readable by the owner only
    pub fn save(&self, path: impl AsRef<Path>) -> ClientResult<()> {
        let path = path.as_ref();
        let io_error = |source| ClientError::TokenIo {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_vec_pretty(self).map_err(|source| ClientError::TokenFormat {
            path: path.to_path_buf(),
            source,
        })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp_file = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp_file.write_all(&json).map_err(io_error)?;
        temp_file.flush().map_err(io_error)?;
        restrict_permissions(temp_file.as_file()).map_err(io_error)?;
        temp_file
            .persist(path)
            .map_err(|e| io_error(e.error))?;

        log::debug!("Saved token to {}", path.display());
        Ok(())
    }

    /// Value of the `Authorization` header
    pub fn auth_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub(crate) fn apply(&mut self, refreshed: RefreshedToken) {
        self.access_token = refreshed.access_token;
        self.token_type = refreshed.token_type;
        self.expires_in = refreshed.expires_in;
        if let Some(refresh_token) = refreshed.refresh_token {
            self.refresh_token = refresh_token;
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
