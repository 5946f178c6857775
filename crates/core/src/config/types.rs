use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::size::deserialize_size;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub addon: AddonConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub trackers: TrackersConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub additional: AdditionalSourcesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    7000
}

/// Add-on identity shown to clients
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddonConfig {
    /// Name shown in the manifest and in every stream name
    #[serde(default = "default_addon_name")]
    pub name: String,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            name: default_addon_name(),
        }
    }
}

fn default_addon_name() -> String {
    "Jackett".to_string()
}

/// Torznab gateway (Jackett) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Gateway hosts, queried in order. Earlier hosts win indexer-id conflicts.
    #[serde(default = "default_gateway_hosts")]
    pub hosts: Vec<GatewayHost>,
    /// Per-request read timeout in milliseconds (default: 8000)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Indexer filter used for catalog discovery
    #[serde(default = "default_indexer_filters")]
    pub indexer_filters: String,
    /// How long a host's indexer catalog stays cached (minutes)
    #[serde(default = "default_cache_indexers_minutes")]
    pub cache_indexers_minutes: u64,
    /// Use `t=movie` / `t=tvsearch` instead of free-text search
    #[serde(default)]
    pub search_by_type: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            hosts: default_gateway_hosts(),
            read_timeout_ms: default_read_timeout_ms(),
            indexer_filters: default_indexer_filters(),
            cache_indexers_minutes: default_cache_indexers_minutes(),
            search_by_type: false,
        }
    }
}

impl GatewayConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_indexers_minutes * 60)
    }
}

/// A single gateway host and its API key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct GatewayHost {
    /// Base URL, e.g. "http://127.0.0.1:9117/"
    pub url: String,
    /// Gateway API key
    #[serde(default)]
    pub api_key: String,
}

impl GatewayHost {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: normalize_host_url(&url.into()),
            api_key: api_key.into(),
        }
    }
}

fn default_gateway_hosts() -> Vec<GatewayHost> {
    vec![GatewayHost::new("http://127.0.0.1:9117/", "")]
}

fn default_read_timeout_ms() -> u64 {
    8000
}

fn default_indexer_filters() -> String {
    "status:healthy,test:passed".to_string()
}

fn default_cache_indexers_minutes() -> u64 {
    30
}

/// Normalize a host URL: default to `http://` and always end with `/`.
pub fn normalize_host_url(url: &str) -> String {
    let url = url.trim();
    let mut normalized = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Search and aggregation tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Overall response deadline in milliseconds (default: 8000)
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// Completion poll interval in milliseconds (default: 500)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Results with fewer seeders are dropped
    #[serde(default = "default_minimum_seeds")]
    pub minimum_seeds: u32,
    /// Maximum number of streams in a response
    #[serde(default = "default_maximum_results")]
    pub maximum_results: usize,
    /// Results larger than this are dropped. Accepts "5GB"-style strings.
    #[serde(
        default = "default_maximum_size",
        deserialize_with = "deserialize_size"
    )]
    pub maximum_size: u64,
    /// Concurrent `.torrent` downloads per request
    #[serde(default = "default_download_torrent_queue")]
    pub download_torrent_queue: usize,
    /// Only keep results that carry a magnet URI
    #[serde(default)]
    pub dont_parse_torrent_files: bool,
    /// Require the release year when matching movie files in a torrent
    #[serde(default)]
    pub search_by_year: bool,
    /// Case-insensitive regex; matching titles are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_titles: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: default_response_timeout_ms(),
            interval_ms: default_interval_ms(),
            minimum_seeds: default_minimum_seeds(),
            maximum_results: default_maximum_results(),
            maximum_size: default_maximum_size(),
            download_torrent_queue: default_download_torrent_queue(),
            dont_parse_torrent_files: false,
            search_by_year: false,
            ignore_titles: None,
        }
    }
}

impl SearchConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_response_timeout_ms() -> u64 {
    8000
}

fn default_interval_ms() -> u64 {
    500
}

fn default_minimum_seeds() -> u32 {
    5
}

fn default_maximum_results() -> usize {
    5
}

fn default_maximum_size() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_download_torrent_queue() -> usize {
    10
}

/// Tracker list augmentation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackersConfig {
    /// Download and add the public "best trackers" list
    #[serde(default)]
    pub add_best: bool,
    /// Add the built-in Russian tracker list
    #[serde(default)]
    pub add_russian: bool,
    /// Add the built-in extra tracker list
    #[serde(default)]
    pub add_extra: bool,
    /// Download the public blacklist and strip those trackers
    #[serde(default)]
    pub remove_blacklist: bool,
    /// Refresh period in minutes (default: 1440)
    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u64,
    #[serde(default = "default_best_url")]
    pub best_url: String,
    #[serde(default = "default_blacklist_url")]
    pub blacklist_url: String,
}

impl Default for TrackersConfig {
    fn default() -> Self {
        Self {
            add_best: false,
            add_russian: false,
            add_extra: false,
            remove_blacklist: false,
            update_interval_minutes: default_update_interval_minutes(),
            best_url: default_best_url(),
            blacklist_url: default_blacklist_url(),
        }
    }
}

impl TrackersConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_minutes * 60)
    }
}

fn default_update_interval_minutes() -> u64 {
    1440
}

fn default_best_url() -> String {
    "https://raw.githubusercontent.com/ngosang/trackerslist/master/trackers_best.txt".to_string()
}

fn default_blacklist_url() -> String {
    "https://raw.githubusercontent.com/ngosang/trackerslist/master/blacklist.txt".to_string()
}

/// Metadata catalog (title/year lookup by IMDb id)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    /// Lookup timeout in milliseconds. Defaults to the response deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            timeout_ms: None,
        }
    }
}

fn default_catalog_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

/// Other stream endpoints merged into every response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdditionalSourcesConfig {
    #[serde(default)]
    pub sources: Vec<AdditionalSource>,
}

/// An external stream endpoint, e.g. `https://addon.example/` named "Other"
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdditionalSource {
    pub url: String,
    pub name: String,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub addon: AddonConfig,
    pub gateway: SanitizedGatewayConfig,
    pub search: SearchConfig,
    pub trackers: TrackersConfig,
    pub catalog: CatalogConfig,
    pub additional_sources: usize,
}

/// Sanitized gateway config (API keys hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGatewayConfig {
    pub hosts: Vec<SanitizedGatewayHost>,
    pub read_timeout_ms: u64,
    pub indexer_filters: String,
    pub cache_indexers_minutes: u64,
    pub search_by_type: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGatewayHost {
    pub url: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            addon: config.addon.clone(),
            gateway: SanitizedGatewayConfig {
                hosts: config
                    .gateway
                    .hosts
                    .iter()
                    .map(|h| SanitizedGatewayHost {
                        url: h.url.clone(),
                        api_key_configured: !h.api_key.is_empty(),
                    })
                    .collect(),
                read_timeout_ms: config.gateway.read_timeout_ms,
                indexer_filters: config.gateway.indexer_filters.clone(),
                cache_indexers_minutes: config.gateway.cache_indexers_minutes,
                search_by_type: config.gateway.search_by_type,
            },
            search: config.search.clone(),
            trackers: config.trackers.clone(),
            catalog: config.catalog.clone(),
            additional_sources: config.additional.sources.len(),
        }
    }
}
