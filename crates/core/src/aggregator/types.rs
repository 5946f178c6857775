//! Request and response types for stream aggregation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MediaInfo;
use crate::gateway::{MediaType, SearchQuery};

/// A parsed stream request: `tt0111161` or `tt0903747:5:14`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub media_type: MediaType,
    pub imdb_id: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamRequestError {
    #[error("Empty stream id")]
    EmptyId,

    #[error("Invalid season/episode in id: {0}")]
    InvalidEpisode(String),
}

impl StreamRequest {
    /// Parse a Stremio stream id. A trailing `.json` is ignored.
    pub fn parse(media_type: MediaType, id: &str) -> Result<Self, StreamRequestError> {
        let id = id.strip_suffix(".json").unwrap_or(id);
        let mut parts = id.split(':');

        let imdb_id = parts.next().unwrap_or("").trim();
        if imdb_id.is_empty() {
            return Err(StreamRequestError::EmptyId);
        }

        let number = |part: Option<&str>| -> Result<Option<u32>, StreamRequestError> {
            match part {
                None | Some("") => Ok(None),
                Some(p) => p
                    .parse()
                    .map(Some)
                    .map_err(|_| StreamRequestError::InvalidEpisode(id.to_string())),
            }
        };
        let season = number(parts.next())?;
        let episode = number(parts.next())?;

        Ok(Self {
            media_type,
            imdb_id: imdb_id.to_string(),
            season,
            episode,
        })
    }

    /// Build the search query once metadata is known.
    pub fn to_query(&self, info: &MediaInfo) -> SearchQuery {
        SearchQuery {
            title: info.title.clone(),
            media_type: self.media_type,
            year: info.year,
            season: self.season,
            episode: self.episode,
        }
    }

    /// `tt123` or `tt123:1:2`.
    pub fn stream_id(&self) -> String {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => format!("{}:{}:{}", self.imdb_id, s, e),
            _ => self.imdb_id.clone(),
        }
    }
}

/// Client hints attached to each stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorHints {
    #[serde(rename = "bingeGroup")]
    pub binge_group: String,
}

/// A resolved, user-facing stream. Identity is `info_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    /// Lowercase hex.
    pub info_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_idx: Option<usize>,
    pub name: String,
    pub title: String,
    /// Quality tag.
    pub tag: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// `tracker:<url>` entries, then `dht:<hash>` entries.
    pub sources: Vec<String>,
    pub seeders: u32,
    pub behavior_hints: BehaviorHints,
}

/// Body of a stream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamsResponse {
    pub streams: Vec<StreamDescriptor>,
    pub cache_max_age: u32,
    pub stale_revalidate: u32,
    pub stale_error: u32,
}

impl StreamsResponse {
    pub fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams,
            cache_max_age: 1440,
            stale_revalidate: 240,
            stale_error: 10080,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Collecting,
    Finalizing,
    Done,
}

/// What moved a session out of `Collecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeReason {
    Deadline,
    Completed,
}

impl FinalizeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizeReason::Deadline => "deadline",
            FinalizeReason::Completed => "completed",
        }
    }
}
