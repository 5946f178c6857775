//! Streams from other Stremio add-ons, merged into each response.
//!
//! Each configured source is asked for the same `{type}/{id}.json` resource.
//! Its streams are re-tagged as if this add-on produced them: the quality is
//! classified from the stream title, the source name in `name` is replaced
//! with our add-on name and `sources` is rebuilt from the tracker snapshot.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::aggregator::{
    binge_group, stream_sources, BehaviorHints, StreamDescriptor, StreamRequest,
};
use crate::config::AdditionalSource;
use crate::metrics;
use crate::naming::quality_tag;
use crate::trackers::TrackerSet;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum AdditionalSourceError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Source returned HTTP {status}")]
    ApiError { status: u16 },

    #[error("Source returned no streams")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    streams: Vec<UpstreamStream>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamStream {
    pub info_hash: String,
    #[serde(default)]
    pub file_idx: Option<usize>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub seeders: Option<u32>,
}

/// Client for the configured additional sources.
pub struct AdditionalSources {
    client: Client,
    sources: Vec<AdditionalSource>,
    addon_name: String,
}

impl AdditionalSources {
    pub fn new(
        sources: Vec<AdditionalSource>,
        addon_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            sources,
            addon_name: addon_name.into(),
        })
    }

    pub fn sources(&self) -> &[AdditionalSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fetch and re-tag the streams `source` has for `request`.
    pub async fn fetch(
        &self,
        source: &AdditionalSource,
        request: &StreamRequest,
        trackers: &TrackerSet,
        minimum_seeds: u32,
    ) -> Result<Vec<StreamDescriptor>, AdditionalSourceError> {
        let result = self.fetch_upstream(source, request).await;
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["additional", if result.is_ok() { "ok" } else { "error" }])
            .inc();

        let streams = result?;
        debug!(source = %source.name, count = streams.len(), "Received additional streams");

        Ok(streams
            .into_iter()
            .filter(|s| meets_minimum_seeds(s, minimum_seeds))
            .map(|s| retag(s, request, &source.name, &self.addon_name, trackers))
            .collect())
    }

    async fn fetch_upstream(
        &self,
        source: &AdditionalSource,
        request: &StreamRequest,
    ) -> Result<Vec<UpstreamStream>, AdditionalSourceError> {
        let url = stream_url(&source.url, request);
        debug!(url = %url, "Additional source lookup");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdditionalSourceError::ApiError {
                status: status.as_u16(),
            });
        }

        let body: UpstreamResponse = response.json().await?;
        if body.streams.is_empty() {
            return Err(AdditionalSourceError::Empty);
        }
        Ok(body.streams)
    }
}

/// `{base}{type}/{id}.json`, with `:season:episode` for episodes.
pub fn stream_url(base: &str, request: &StreamRequest) -> String {
    let separator = if base.ends_with('/') { "" } else { "/" };
    format!(
        "{}{}{}/{}.json",
        base,
        separator,
        request.media_type.as_str(),
        request.stream_id()
    )
}

/// Streams without a seeders count are kept.
pub fn meets_minimum_seeds(upstream: &UpstreamStream, minimum_seeds: u32) -> bool {
    upstream.seeders.map_or(true, |seeders| seeders >= minimum_seeds)
}

/// Rewrite an upstream stream so it reads like one of ours.
pub fn retag(
    upstream: UpstreamStream,
    request: &StreamRequest,
    source_name: &str,
    addon_name: &str,
    trackers: &TrackerSet,
) -> StreamDescriptor {
    let quality = quality_tag(&upstream.title);
    let info_hash = upstream.info_hash.to_lowercase();
    let name = if source_name.is_empty() {
        upstream.name
    } else {
        upstream.name.replacen(source_name, addon_name, 1)
    };

    StreamDescriptor {
        file_idx: upstream.file_idx,
        name,
        title: upstream.title,
        tag: quality.to_string(),
        media_type: request.media_type,
        sources: stream_sources(&[], trackers, &info_hash),
        seeders: upstream.seeders.unwrap_or(0),
        behavior_hints: BehaviorHints {
            binge_group: binge_group(quality, &info_hash),
        },
        info_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MediaType;

    fn upstream() -> UpstreamStream {
        serde_json::from_str(
            r#"{
                "infoHash": "ABCDEF0123456789ABCDEF0123456789ABCDEF01",
                "fileIdx": 3,
                "name": "Torrentio\n4k",
                "title": "Heat.1995.2160p.UHD.BluRay",
                "seeders": 77
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_stream_url() {
        let movie = StreamRequest::parse(MediaType::Movie, "tt0113277").unwrap();
        assert_eq!(
            stream_url("https://other.example/stream/", &movie),
            "https://other.example/stream/movie/tt0113277.json"
        );

        let episode = StreamRequest::parse(MediaType::Series, "tt0903747:5:14").unwrap();
        assert_eq!(
            stream_url("https://other.example/stream", &episode),
            "https://other.example/stream/series/tt0903747:5:14.json"
        );
    }

    #[test]
    fn test_retag_rewrites_identity() {
        let request = StreamRequest::parse(MediaType::Movie, "tt0113277").unwrap();
        let trackers = TrackerSet::new(vec!["udp://extra:1".to_string()], vec![]);

        let stream = retag(upstream(), &request, "Torrentio", "Jackett", &trackers);

        let hash = "abcdef0123456789abcdef0123456789abcdef01";
        assert_eq!(stream.info_hash, hash);
        assert_eq!(stream.name, "Jackett\n4k");
        assert_eq!(stream.tag, "4K");
        assert_eq!(stream.file_idx, Some(3));
        assert_eq!(stream.seeders, 77);
        assert_eq!(stream.media_type, MediaType::Movie);
        assert_eq!(
            stream.sources,
            vec!["tracker:udp://extra:1".to_string(), format!("dht:{}", hash)]
        );
        assert_eq!(stream.behavior_hints.binge_group, format!("Jackett|4K|{}", hash));
    }

    #[test]
    fn test_minimum_seeds_applies_to_upstream_streams() {
        let with_seeders = |seeders: Option<u32>| UpstreamStream {
            seeders,
            ..upstream()
        };

        assert!(meets_minimum_seeds(&with_seeders(Some(77)), 5));
        assert!(meets_minimum_seeds(&with_seeders(Some(5)), 5));
        assert!(!meets_minimum_seeds(&with_seeders(Some(4)), 5));
        assert!(!meets_minimum_seeds(&with_seeders(Some(0)), 1));
        assert!(meets_minimum_seeds(&with_seeders(None), 5));
    }

    #[test]
    fn test_missing_seeders_default_to_zero() {
        let upstream: UpstreamStream =
            serde_json::from_str(r#"{"infoHash": "aa", "title": "x"}"#).unwrap();
        let request = StreamRequest::parse(MediaType::Movie, "tt1").unwrap();
        let stream = retag(upstream, &request, "Other", "Jackett", &TrackerSet::empty());
        assert_eq!(stream.seeders, 0);
        assert_eq!(stream.file_idx, None);
        assert_eq!(stream.tag, "Unknown");
    }
}
