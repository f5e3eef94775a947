//! HTTP transport seam
//!
//! Geocoding and forecast lookups go through the [`HttpClient`] trait so the
//! network can be swapped for a fake in tests. [`ReqwestHttpClient`] is the
//! production implementation.

use crate::config::ApiConfig;
use crate::{Result, WeatherPlanError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a successful JSON body.
    ///
    /// Non-success statuses become [`WeatherPlanError::Upstream`], using the
    /// Open-Meteo `reason` field when the body carries one. Undecodable
    /// bodies become [`WeatherPlanError::InvalidResponseShape`].
    pub fn json<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        if !self.is_success() {
            return Err(WeatherPlanError::upstream(self.status, self.upstream_reason()));
        }
        serde_json::from_str(&self.body).map_err(|e| {
            WeatherPlanError::invalid_shape(format!("{what} response could not be decoded: {e}"))
        })
    }

    fn upstream_reason(&self) -> String {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            reason: Option<String>,
        }

        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.reason)
            .unwrap_or_else(|| {
                let body = self.body.trim();
                if body.is_empty() {
                    "no response body".to_string()
                } else {
                    body.chars().take(200).collect()
                }
            })
    }
}

/// Performs a GET and returns the raw exchange.
///
/// Implementations fail only with [`WeatherPlanError::Transport`]; status
/// handling is left to the caller.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        (**self).fetch(url).await
    }
}

/// [`HttpClient`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a client with the configured timeout and user agent
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(WeatherPlanError::transport)?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error after {:.3}s: {}", start.elapsed().as_secs_f64(), e);
            WeatherPlanError::transport(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(WeatherPlanError::transport)?;

        let elapsed = start.elapsed();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(HttpResponse { status, body })
    }
}
