//! Types shared by the gateway client and the search pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayHost;

/// Kind of media being searched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Torznab category code used for free-text search.
    pub fn category(&self) -> u32 {
        match self {
            MediaType::Movie => 2000,
            MediaType::Series => 5000,
        }
    }

    /// Torznab search verb used in search-by-type mode.
    pub fn search_verb(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tvsearch",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            other => Err(format!("unsupported media type: {}", other)),
        }
    }
}

/// What to search for. Immutable for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Canonical title from the metadata catalog.
    pub title: String,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl SearchQuery {
    pub fn movie(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            title: title.into(),
            media_type: MediaType::Movie,
            year,
            season: None,
            episode: None,
        }
    }

    pub fn episode(title: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            title: title.into(),
            media_type: MediaType::Series,
            year: None,
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// Season and episode, when both are known.
    pub fn season_episode(&self) -> Option<(u32, u32)> {
        self.season.zip(self.episode)
    }
}

/// An indexer configured on a gateway host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerDescriptor {
    pub id: String,
    pub supports_movie: bool,
    pub supports_series: bool,
    /// URL of the host that reported this indexer.
    pub source_host: String,
}

impl IndexerDescriptor {
    pub fn supports(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::Movie => self.supports_movie,
            MediaType::Series => self.supports_series,
        }
    }
}

/// One item of an indexer's result feed, before reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub title: String,
    /// http(s) download link, or a magnet when the feed only has `link`.
    pub link: Option<String>,
    pub magnet_uri: Option<String>,
    pub seeders: u32,
    pub peers: u32,
    pub size_bytes: u64,
    pub published_at: Option<DateTime<Utc>>,
    /// Indexer id that returned this item.
    pub source_indexer: String,
    /// Release-title remainder used for quality classification.
    pub extra_tag: String,
}

impl RawResult {
    /// Magnet URI, if the item carries one.
    pub fn magnet(&self) -> Option<&str> {
        self.magnet_uri
            .as_deref()
            .filter(|m| crate::resolver::is_magnet(m))
    }

    /// http(s) link, if the item carries one.
    pub fn http_link(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| crate::resolver::is_http(l))
    }
}

/// Errors from a single gateway call. Never fatal to a session.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway host unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Gateway API error: HTTP {status}")]
    ApiError { status: u16 },

    #[error("Failed to parse gateway response: {0}")]
    ParseError(String),

    #[error("Gateway request timed out")]
    Timeout,
}

/// A Torznab gateway. Implemented by `GatewayClient` and by test doubles.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Indexers configured on `host`. Empty on any failure.
    async fn fetch_indexers(&self, host: &GatewayHost) -> Vec<IndexerDescriptor>;

    /// Search one indexer on `host`.
    async fn search_indexer(
        &self,
        host: &GatewayHost,
        indexer: &IndexerDescriptor,
        query: &SearchQuery,
    ) -> Result<Vec<RawResult>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_codes() {
        assert_eq!(MediaType::Movie.category(), 2000);
        assert_eq!(MediaType::Series.category(), 5000);
        assert_eq!(MediaType::Movie.search_verb(), "movie");
        assert_eq!(MediaType::Series.search_verb(), "tvsearch");
        assert_eq!("series".parse::<MediaType>().unwrap(), MediaType::Series);
        assert!("channel".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_media_type_serialization() {
        assert_eq!(serde_json::to_string(&MediaType::Series).unwrap(), "\"series\"");
    }

    #[test]
    fn test_raw_result_reference_accessors() {
        let raw = RawResult {
            title: "x".to_string(),
            link: Some("magnet:?xt=urn:btih:abc".to_string()),
            magnet_uri: None,
            seeders: 1,
            peers: 1,
            size_bytes: 1,
            published_at: None,
            source_indexer: "i".to_string(),
            extra_tag: String::new(),
        };
        assert!(raw.magnet().is_none());
        assert!(raw.http_link().is_none());
    }
}
