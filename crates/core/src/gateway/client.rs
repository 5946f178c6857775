//! Jackett (Torznab) gateway client.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{GatewayConfig, GatewayHost};
use crate::metrics;
use crate::naming::{episode_tag, extra_tag, simple_name};

use super::cache::IndexerCache;
use super::feed::{parse_bytes, parse_count, parse_feed_date, parse_indexers, parse_items, FeedItem};
use super::{Gateway, GatewayError, IndexerDescriptor, RawResult, SearchQuery};

static UFC_EVENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)UFC\s*\d+").unwrap());

/// HTTP client for one or more Jackett hosts.
///
/// Holds the process-wide indexer catalog cache, so a single instance should
/// be shared between requests.
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
    cache: IndexerCache,
}

impl GatewayClient {
    /// Create a new client. Every call carries `read_timeout_ms`.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;

        let cache = IndexerCache::new(config.cache_ttl());

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &IndexerCache {
        &self.cache
    }

    /// Build the catalog discovery URL for a host.
    fn build_indexers_url(&self, host: &GatewayHost) -> String {
        format!(
            "{}api/v2.0/indexers/{}/results/torznab/api?apikey={}&t=indexers&configured=true",
            host.url,
            urlencoding::encode(&self.config.indexer_filters),
            urlencoding::encode(&host.api_key)
        )
    }

    /// Build the search URL for one indexer on a host.
    fn build_search_url(&self, host: &GatewayHost, indexer: &str, query: &SearchQuery) -> String {
        format!(
            "{}api/v2.0/indexers/{}/results/torznab/api?apikey={}{}",
            host.url,
            urlencoding::encode(indexer),
            urlencoding::encode(&host.api_key),
            search_params(query, self.config.search_by_type)
        )
    }

    async fn get_text(&self, url: &str) -> Result<String, GatewayError> {
        let response = self.client.get(url).send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::ApiError {
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(map_request_error)
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn fetch_indexers(&self, host: &GatewayHost) -> Vec<IndexerDescriptor> {
        if let Some(cached) = self.cache.get(&host.url).await {
            debug!(host = %host.url, "Loading indexers from cache");
            return cached;
        }

        let body = match self.get_text(&self.build_indexers_url(host)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(host = %host.url, error = %e, "Error fetching indexers");
                return Vec::new();
            }
        };

        let indexers: Vec<IndexerDescriptor> = match parse_indexers(&body) {
            Ok(entries) => entries
                .into_iter()
                .map(|entry| IndexerDescriptor {
                    id: entry.id,
                    supports_movie: entry.movie,
                    supports_series: entry.series,
                    source_host: host.url.clone(),
                })
                .collect(),
            Err(e) => {
                warn!(host = %host.url, error = %e, "Could not parse indexers");
                return Vec::new();
            }
        };

        if indexers.is_empty() {
            warn!(host = %host.url, "No indexers configured on host");
            return indexers;
        }

        debug!(host = %host.url, count = indexers.len(), "Fetched indexers");
        self.cache.insert(&host.url, indexers.clone()).await;
        indexers
    }

    async fn search_indexer(
        &self,
        host: &GatewayHost,
        indexer: &IndexerDescriptor,
        query: &SearchQuery,
    ) -> Result<Vec<RawResult>, GatewayError> {
        let url = self.build_search_url(host, &indexer.id, query);
        debug!(indexer = %indexer.id, host = %host.url, "Searching indexer");

        let body = self.get_text(&url).await.inspect_err(|_| {
            metrics::INDEXER_SEARCHES.with_label_values(&["error"]).inc();
        })?;

        if body.trim().is_empty() {
            metrics::INDEXER_SEARCHES.with_label_values(&["empty"]).inc();
            return Ok(Vec::new());
        }

        let items = match parse_items(&body) {
            Ok(items) => items,
            Err(e) => {
                warn!(indexer = %indexer.id, error = %e, "Malformed search feed");
                metrics::INDEXER_SEARCHES.with_label_values(&["empty"]).inc();
                return Ok(Vec::new());
            }
        };

        let results: Vec<RawResult> = items
            .iter()
            .filter_map(|item| raw_from_item(item, &indexer.id, &query.title))
            .collect();

        metrics::INDEXER_SEARCHES
            .with_label_values(&[if results.is_empty() { "empty" } else { "ok" }])
            .inc();
        debug!(indexer = %indexer.id, results = results.len(), "Indexer search complete");

        Ok(results)
    }
}

fn map_request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::UpstreamUnavailable(e.to_string())
    }
}

/// Query-string suffix (starting with `&`) for a search.
fn search_params(query: &SearchQuery, search_by_type: bool) -> String {
    let name = simple_name(&query.title);

    if query.title.contains("UFC") {
        let event = UFC_EVENT
            .find(&query.title)
            .map(|m| m.as_str().to_string())
            .unwrap_or(name);
        return format!("&t=search&cat=2000,5000&q={}", urlencoding::encode(&event));
    }

    if search_by_type {
        let mut params = format!(
            "&t={}&q={}",
            query.media_type.search_verb(),
            urlencoding::encode(&name)
        );
        if let Some((season, episode)) = query.season_episode() {
            params.push_str(&format!("&season={}&ep={}", season, episode));
        } else if let Some(year) = query.year {
            params.push_str(&format!("&year={}", year));
        }
        return params;
    }

    let qualifier = match (query.season_episode(), query.year) {
        (Some((season, episode)), _) => Some(episode_tag(season, episode)),
        (None, Some(year)) => Some(year.to_string()),
        (None, None) => None,
    };
    let text = match qualifier {
        Some(q) => format!("{} {}", name, q),
        None => name,
    };

    format!(
        "&t=search&cat={}&q={}",
        query.media_type.category(),
        urlencoding::encode(&text)
    )
}

/// Map a flattened feed item to a `RawResult`. Items without a title are skipped.
fn raw_from_item(item: &FeedItem, indexer: &str, media_title: &str) -> Option<RawResult> {
    let title = item.get("title").filter(|t| !t.is_empty())?.clone();

    let link = item.get("link").filter(|l| !l.is_empty()).cloned();
    let mut magnet_uri = item
        .get("magneturl")
        .filter(|m| crate::resolver::is_magnet(m))
        .cloned();

    if magnet_uri.is_none() {
        if let Some(l) = link.as_deref().filter(|l| crate::resolver::is_magnet(l)) {
            debug!(indexer = indexer, "Promoting magnet link to magnet URI");
            magnet_uri = Some(l.to_string());
        }
    }

    Some(RawResult {
        extra_tag: extra_tag(&title, media_title),
        title,
        link,
        magnet_uri,
        seeders: parse_count(item, "seeders"),
        peers: parse_count(item, "peers"),
        size_bytes: parse_bytes(item, "size"),
        published_at: item.get("pubDate").and_then(|d| parse_feed_date(d)),
        source_indexer: indexer.to_string(),
    })
}
