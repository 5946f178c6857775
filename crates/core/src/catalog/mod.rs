//! Media metadata lookup by IMDb id.
//!
//! A stream request only knows an IMDb id; the canonical title and year used
//! to build search queries come from a metadata catalog (Cinemeta).

mod cinemeta;

pub use cinemeta::CinemetaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::MediaType;

/// Canonical metadata for one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

impl MediaInfo {
    pub fn new(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

/// Errors that can occur when looking up metadata.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error status.
    #[error("Catalog API error: HTTP {status}")]
    ApiError { status: u16 },

    /// Response had no usable title.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be parsed.
    #[error("Failed to parse catalog response: {0}")]
    ParseError(String),
}

/// Metadata catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup(&self, media_type: MediaType, imdb_id: &str)
        -> Result<MediaInfo, CatalogError>;
}
