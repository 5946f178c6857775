//! Single-hop download of `.torrent` links.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use thiserror::Error;

/// What a link pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A 3xx response with a `Location` header.
    Redirect(String),
    /// A 2xx body.
    Body(Vec<u8>),
}

/// Errors from fetching a reference link.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Reference request failed: {0}")]
    Fetch(String),

    #[error("Reference returned HTTP {0}")]
    Status(u16),

    #[error("Reference request timed out")]
    Timeout,
}

/// Downloads a reference link without following redirects.
#[async_trait]
pub trait ReferenceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ReferenceError>;
}

/// reqwest-backed fetcher. Redirects are returned, not followed.
pub struct HttpReferenceFetcher {
    client: Client,
}

impl HttpReferenceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ReferenceError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ReferenceError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReferenceFetcher for HttpReferenceFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ReferenceError> {
        let response = self.client.get(url).send().await.map_err(map_error)?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(ReferenceError::Status(status.as_u16()));
        }

        if let Some(location) = response.headers().get(LOCATION) {
            let location = location
                .to_str()
                .map_err(|e| ReferenceError::Fetch(e.to_string()))?;
            return Ok(FetchOutcome::Redirect(location.to_string()));
        }

        if status.is_redirection() {
            return Err(ReferenceError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_error)?;
        Ok(FetchOutcome::Body(body.to_vec()))
    }
}

fn map_error(e: reqwest::Error) -> ReferenceError {
    if e.is_timeout() {
        ReferenceError::Timeout
    } else {
        ReferenceError::Fetch(e.to_string())
    }
}
