//! Music service configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Spotify Web API root
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Spotify accounts service root
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Where the access token lives and which endpoints to talk to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Token file produced by the authorization flow
    pub token_file: PathBuf,

    pub api_url: String,

    pub accounts_url: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(".token.json"),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }
}

impl ConfigSection for SpotifyConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.token_file.as_os_str().is_empty() {
            results.push(Err(ValidationError::new(
                "spotify.token_file",
                "must not be empty",
            )));
        }

        results.push(Validator::http_url(&self.api_url, "spotify.api_url"));
        results.push(Validator::http_url(&self.accounts_url, "spotify.accounts_url"));

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.token_file = other.token_file;
        self.api_url = other.api_url;
        self.accounts_url = other.accounts_url;
    }

    fn section_name(&self) -> &'static str {
        "spotify"
    }
}
