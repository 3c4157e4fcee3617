// crates/content-sources/src/spotify.rs
//! Spotify Web API playlist client

use crate::error::ClientResult;
use crate::token::{Profile, RefreshedToken, Token};
use async_trait::async_trait;
use radiosync_core::{DownstreamTrack, Playlist, SourceResult};
use radiosync_network::{Client, Method};
use radiosync_sync_engine::DownstreamService;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Web API root
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Accounts service root, used for token refresh
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    uri: String,
}

impl From<TrackObject> for DownstreamTrack {
    fn from(track: TrackObject) -> Self {
        DownstreamTrack::new(track.id, track.name, track.uri)
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// Null for local files and tracks removed from the catalog
    #[serde(default)]
    track: Option<TrackObject>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

impl TrackPage {
    fn into_tracks(self) -> Vec<DownstreamTrack> {
        self.items
            .into_iter()
            .filter_map(|item| item.track)
            .map(DownstreamTrack::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
    #[serde(default)]
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct PlaylistSummary {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Paged<TrackObject>,
}

/// Spotify client authorized by a token file
///
/// Requests carry the stored access token. When the service answers 401 the
/// token is refreshed, written back to the token file and the request is
/// sent once more.
#[derive(Debug)]
pub struct Spotify {
    http: Client,
    token: RwLock<Token>,
    token_file: PathBuf,
    api_url: String,
    accounts_url: String,
}

impl Spotify {
    /// Loads the token file and builds a client around it
    pub fn from_token_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let token = Token::load(path)?;
        Self::new(token, path)
    }

    /// Builds a client for an already loaded token
    pub fn new(token: Token, token_file: impl Into<PathBuf>) -> ClientResult<Self> {
        Ok(Self {
            http: Client::new()?,
            token: RwLock::new(token),
            token_file: token_file.into(),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        })
    }

    /// Overrides the service roots
    pub fn with_endpoints(mut self, api_url: impl Into<String>, accounts_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self.accounts_url = accounts_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Snapshot of the current token
    pub async fn token(&self) -> Token {
        self.token.read().await.clone()
    }

    /// Fetches the profile of the token owner
    pub async fn current_user(&self) -> ClientResult<Profile> {
        let url = format!("{}/me", self.api_url);
        self.get_json(&url).await
    }

    /// Returns the user ID, looking it up and saving it if the token file
    /// does not carry one
    async fn user_id(&self) -> ClientResult<String> {
        let id = self.token.read().await.profile.id.clone();
        if !id.is_empty() {
            return Ok(id);
        }

        let profile = self.current_user().await?;
        log::info!("Resolved Spotify user {}", profile.id);

        let mut token = self.token.write().await;
        token.profile = profile;
        token.save(&self.token_file)?;
        Ok(token.profile.id.clone())
    }

    async fn playlists_url(&self) -> ClientResult<String> {
        Ok(format!("{}/users/{}/playlists", self.api_url, self.user_id().await?))
    }

    async fn tracks_url(&self, playlist: &Playlist) -> ClientResult<String> {
        Ok(format!("{}/{}/tracks", self.playlists_url().await?, playlist.id))
    }

    /// Exchanges the refresh token for a new access token and saves it
    async fn refresh_token(&self) -> ClientResult<()> {
        let (refresh_token, auth) = {
            let token = self.token.read().await;
            (token.refresh_token.clone(), token.auth.clone())
        };

        let url = format!("{}/api/token", self.accounts_url);
        let request = self
            .http
            .request(Method::POST, &url)
            .basic_auth(&auth.client_id, Some(&auth.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ]);
        let refreshed: RefreshedToken = self.http.send_json(request).await?;

        let mut token = self.token.write().await;
        token.apply(refreshed);
        token.save(&self.token_file)?;
        log::info!("Refreshed access token");
        Ok(())
    }

    /// Sends an authorized request, refreshing and replaying once on 401
    async fn send<B>(&self, build: B) -> ClientResult<Response>
    where
        B: Fn() -> RequestBuilder,
    {
        let header = self.token.read().await.auth_header();
        match self.http.send(build().header(AUTHORIZATION, header)).await {
            Err(e) if e.is_unauthorized() => {
                log::debug!("Access token rejected, refreshing");
                self.refresh_token().await?;
                let header = self.token.read().await.auth_header();
                Ok(self.http.send(build().header(AUTHORIZATION, header)).await?)
            }
            result => Ok(result?),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let response = self.send(|| self.http.request(Method::GET, url)).await?;
        Ok(Client::decode(response).await?)
    }

    async fn find_playlist(&self, name: &str) -> ClientResult<Option<PlaylistSummary>> {
        let url = self.playlists_url().await?;
        let playlists: Paged<PlaylistSummary> = self.get_json(&url).await?;
        Ok(playlists.items.into_iter().find(|p| p.name == name))
    }

    async fn playlist_by_id(&self, id: &str) -> ClientResult<PlaylistObject> {
        let url = format!("{}/{}", self.playlists_url().await?, id);
        self.get_json(&url).await
    }

    async fn create_playlist(&self, name: &str) -> ClientResult<PlaylistObject> {
        let url = self.playlists_url().await?;
        let body = json!({ "name": name, "public": false });
        let response = self
            .send(|| self.http.request(Method::POST, &url).json(&body))
            .await?;
        Ok(Client::decode(response).await?)
    }

    /// Finds a playlist by exact name, creating a private one if absent
    pub async fn get_or_create(&self, name: &str) -> ClientResult<Playlist> {
        let object = match self.find_playlist(name).await? {
            Some(summary) => self.playlist_by_id(&summary.id).await?,
            None => {
                log::info!("Creating playlist '{}'", name);
                self.create_playlist(name).await?
            }
        };

        Ok(Playlist::new(object.id, object.name).with_tracks(object.tracks.into_tracks()))
    }

    /// The last `limit` tracks of the playlist, oldest first
    pub async fn recent(&self, playlist: &Playlist, limit: usize) -> ClientResult<Vec<DownstreamTrack>> {
        let first = self.playlist_by_id(&playlist.id).await?.tracks;

        // Everything fits in the first page
        if first.total <= first.items.len() {
            let tracks = first.into_tracks();
            let skip = tracks.len().saturating_sub(limit);
            return Ok(tracks.into_iter().skip(skip).collect());
        }

        let offset = first.total.saturating_sub(limit);
        let mut url = format!("{}?offset={}", self.tracks_url(playlist).await?, offset);
        let mut tracks = Vec::with_capacity(limit);

        loop {
            let page: TrackPage = self.get_json(&url).await?;
            let next = page.next.clone();
            tracks.extend(page.into_tracks());

            match next {
                Some(next) if tracks.len() < limit => url = next,
                _ => break,
            }
        }

        Ok(tracks)
    }

    /// Searches for a track by artist and title, returning the best match
    pub async fn search(&self, artist: &str, title: &str) -> ClientResult<Vec<DownstreamTrack>> {
        let url = format!("{}/search", self.api_url);
        let query = format!("artist:{} track:{}", artist, title);

        let response = self
            .send(|| {
                self.http
                    .request(Method::GET, &url)
                    .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            })
            .await?;
        let result: SearchResponse = Client::decode(response).await?;

        Ok(result.tracks.items.into_iter().map(DownstreamTrack::from).collect())
    }

    /// Appends a track to the playlist
    pub async fn add(&self, playlist: &Playlist, track: &DownstreamTrack) -> ClientResult<()> {
        let url = self.tracks_url(playlist).await?;
        let body = json!([track.uri]);
        self.send(|| self.http.request(Method::POST, &url).json(&body))
            .await?;
        Ok(())
    }

    /// Removes every occurrence of a track from the playlist
    pub async fn delete(&self, playlist: &Playlist, track: &DownstreamTrack) -> ClientResult<()> {
        let url = self.tracks_url(playlist).await?;
        let body = json!({ "tracks": [{ "uri": track.uri }] });
        self.send(|| self.http.request(Method::DELETE, &url).json(&body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DownstreamService for Spotify {
    async fn get_or_create_playlist(&self, name: &str) -> SourceResult<Playlist> {
        Ok(self.get_or_create(name).await?)
    }

    async fn recent_tracks(
        &self,
        playlist: &Playlist,
        limit: usize,
    ) -> SourceResult<Vec<DownstreamTrack>> {
        Ok(self.recent(playlist, limit).await?)
    }

    async fn search_by_artist_track(
        &self,
        artist: &str,
        title: &str,
    ) -> SourceResult<Vec<DownstreamTrack>> {
        Ok(self.search(artist, title).await?)
    }

    async fn add_track(&self, playlist: &Playlist, track: &DownstreamTrack) -> SourceResult<()> {
        Ok(self.add(playlist, track).await?)
    }

    async fn delete_track(&self, playlist: &Playlist, track: &DownstreamTrack) -> SourceResult<()> {
        Ok(self.delete(playlist, track).await?)
    }
}
