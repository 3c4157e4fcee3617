//! Radio feed configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Public NRK programme API
pub const DEFAULT_FEED_URL: &str = "http://v7.psapi.nrk.no";

/// Which station to follow and where its live feed is served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadioConfig {
    /// Playlist name, used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Channel ID, used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Base URL of the live feed API
    pub feed_url: String,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            name: None,
            id: None,
            feed_url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

impl ConfigSection for RadioConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![Validator::http_url(&self.feed_url, "radio.feed_url")];

        if let Some(ref name) = self.name {
            results.push(Validator::not_empty(name, "radio.name"));
        }
        if let Some(ref id) = self.id {
            results.push(Validator::not_empty(id, "radio.id"));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.id.is_some() {
            self.id = other.id;
        }
        self.feed_url = other.feed_url;
    }

    fn section_name(&self) -> &'static str {
        "radio"
    }
}
