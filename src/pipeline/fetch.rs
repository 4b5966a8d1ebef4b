//! Page fetching: one GET per URL, no retries.
//!
//! Stages talk to the network only through [`PageFetcher`], so tests can feed
//! canned markup and the run stays single-attempt: a failed fetch is one lost
//! data point, never a retry loop. [`HttpFetcher`] is the reqwest-backed
//! implementation used by the CLI.

use crate::config::PipelineConfig;
use crate::error::FlagDeckError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Why a single fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    /// The request exceeded its timeout.
    #[error("request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// Connection, TLS or protocol failure.
    #[error("request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The body could not be read or decoded.
    #[error("could not read body of '{url}': {reason}")]
    Body { url: String, reason: String },
}

/// Source of raw page markup and image bytes.
///
/// `timeout = None` means no per-request timeout.
pub trait PageFetcher: Send + Sync {
    /// Fetch a document as text.
    fn fetch_text(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetch a binary payload.
    fn fetch_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// reqwest-backed fetcher sending a fixed `User-Agent`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client that identifies itself with `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    async fn get(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, FetchError> {
        let mut request = self.client.get(url);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify(url, timeout, e))?;

        let status = response.status();
        debug!("GET {} → {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        let response = self.get(url, timeout).await?;
        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url, timeout).await?;
        let bytes = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Fetch the index page. Unlike every other fetch, failure here is fatal.
pub async fn fetch_index<F: PageFetcher>(
    fetcher: &F,
    config: &PipelineConfig,
) -> Result<String, FlagDeckError> {
    info!("Fetching index page {}", config.index_url);
    fetcher
        .fetch_text(&config.index_url, config.index_timeout())
        .await
        .map_err(|e| FlagDeckError::IndexFetchFailed {
            url: config.index_url.clone(),
            reason: e.to_string(),
        })
}

fn classify(url: &str, timeout: Option<Duration>, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            secs: timeout.map(|t| t.as_secs()).unwrap_or_default(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
