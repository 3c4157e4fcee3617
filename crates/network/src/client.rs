// crates/network/src/client.rs
//! HTTP client wrapper
//!
//! No retries happen at this layer; callers wrap whole collaborator calls
//! in their own retry budget.

use crate::error::{NetworkError, NetworkResult};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("radiosync/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// HTTP client with status checking and JSON decoding
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts building a request
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.inner.request(method, url)
    }

    /// Sends a request, turning non-success statuses into errors
    pub async fn send(&self, request: RequestBuilder) -> NetworkResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::debug!("HTTP {} response body: {}", status.as_u16(), body);

        Err(NetworkError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Sends a request and decodes the JSON response body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> NetworkResult<T> {
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    /// Decodes a JSON response body
    pub async fn decode<T: DeserializeOwned>(response: Response) -> NetworkResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }

    /// Performs a GET request and decodes the JSON response body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> NetworkResult<T> {
        self.send_json(self.request(Method::GET, url)).await
    }
}
