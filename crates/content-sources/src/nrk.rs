// crates/content-sources/src/nrk.rs
//! NRK radio live feed

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use radiosync_core::{SourceResult, UpstreamItem};
use radiosync_network::Client;
use radiosync_sync_engine::UpstreamFeed;
use serde::Deserialize;

/// Public NRK programme API
pub const DEFAULT_BASE_URL: &str = "http://v7.psapi.nrk.no";

const CHANNEL_IDS: [&str; 13] = [
    "p1pluss",
    "p2",
    "p3",
    "p13",
    "mp3",
    "radio_super",
    "klassisk",
    "jazz",
    "folkemusikk",
    "urort",
    "radioresepsjonen",
    "national_rap_show",
    "pyro",
];

/// Known NRK radio channel IDs
pub fn channel_ids() -> &'static [&'static str] {
    &CHANNEL_IDS
}

/// One element of the live feed as NRK encodes it
#[derive(Debug, Deserialize)]
struct LiveElement {
    #[serde(default)]
    title: Option<String>,
    /// NRK puts the artist in the description
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(rename = "startTime", default)]
    start_time: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

impl From<LiveElement> for UpstreamItem {
    fn from(element: LiveElement) -> Self {
        UpstreamItem::new(
            element.title.unwrap_or_default(),
            element.description.unwrap_or_default(),
            element.kind.unwrap_or_default(),
            element.start_time.unwrap_or_default(),
            element.duration.unwrap_or_default(),
        )
    }
}

/// An NRK radio channel
#[derive(Debug, Clone)]
pub struct NrkRadio {
    name: String,
    id: String,
    base_url: String,
    client: Client,
}

impl NrkRadio {
    /// Creates a channel, rejecting unknown IDs
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> ClientResult<Self> {
        let id = id.into();
        if !channel_ids().contains(&id.as_str()) {
            return Err(ClientError::UnknownChannel(id));
        }

        Ok(Self {
            name: name.into(),
            id,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new()?,
        })
    }

    /// Points the client at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Uses a preconfigured HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// URL of the previous/current/next live elements
    pub fn url(&self) -> String {
        format!("{}/channels/{}/liveelements/now", self.base_url, self.id)
    }
}

#[async_trait]
impl UpstreamFeed for NrkRadio {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_window(&self) -> SourceResult<Vec<UpstreamItem>> {
        let url = self.url();
        log::debug!("Fetching live elements from {}", url);

        let elements: Vec<LiveElement> = self.client.get_json(&url).await?;
        Ok(elements.into_iter().map(UpstreamItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_channel_is_rejected() {
        let err = NrkRadio::new("Nowhere", "p42").unwrap_err();
        assert!(matches!(err, ClientError::UnknownChannel(id) if id == "p42"));
    }

    #[test]
    fn test_url() {
        let radio = NrkRadio::new("P3", "p3").unwrap();
        assert_eq!(
            radio.url(),
            "http://v7.psapi.nrk.no/channels/p3/liveelements/now"
        );

        let radio = radio.with_base_url("http://localhost:8080/");
        assert_eq!(
            radio.url(),
            "http://localhost:8080/channels/p3/liveelements/now"
        );
    }

    #[test]
    fn test_channel_ids() {
        assert_eq!(channel_ids().len(), 13);
        assert!(channel_ids().contains(&"p3"));
        assert!(channel_ids().contains(&"pyro"));
    }

    #[test]
    fn test_live_element_mapping() {
        let json = r#"{
            "title": "Like a Rolling Stone",
            "description": "Bob Dylan",
            "type": "Music",
            "startTime": "/Date(1405971945000+0200)/",
            "duration": "PT6M10S",
            "programId": "ignored"
        }"#;

        let element: LiveElement = serde_json::from_str(json).unwrap();
        let item = UpstreamItem::from(element);

        assert_eq!(item.title, "Like a Rolling Stone");
        assert_eq!(item.artist, "Bob Dylan");
        assert!(item.is_music());
        assert_eq!(item.duration().unwrap().as_secs(), 370);
    }

    #[test]
    fn test_live_element_nulls() {
        let element: LiveElement =
            serde_json::from_str(r#"{"title": "News", "description": null, "type": "Program"}"#)
                .unwrap();
        let item = UpstreamItem::from(element);

        assert_eq!(item.artist, "");
        assert!(!item.is_music());
        assert!(item.start_time().is_err());
    }
}
