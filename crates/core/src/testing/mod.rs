//! Testing utilities and mock implementations.
//!
//! Mocks for every upstream seam of the aggregator, so a full request can be
//! exercised without a gateway, a metadata catalog or download links.
//!
//! # Example
//!
//! ```rust,ignore
//! use jackett_relay_core::testing::{fixtures, MockCatalog, MockGateway, MockReferenceFetcher};
//!
//! let gateway = MockGateway::new();
//! gateway.set_indexers("http://jackett:9117/", vec![fixtures::indexer("rarbg", "http://jackett:9117/")]).await;
//! gateway.set_results("http://jackett:9117/", "rarbg", vec![fixtures::raw_result("a", 10, 1000)]).await;
//!
//! let catalog = MockCatalog::new();
//! catalog.add("tt0113277", fixtures::media_info("Heat", Some(1995))).await;
//!
//! // Build a ResultAggregator from the mocks...
//! ```

mod mock_catalog;
mod mock_gateway;
mod mock_reference_fetcher;

pub use mock_catalog::MockCatalog;
pub use mock_gateway::{MockGateway, RecordedIndexerSearch};
pub use mock_reference_fetcher::MockReferenceFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::aggregator::{BehaviorHints, StreamDescriptor};
    use crate::catalog::MediaInfo;
    use crate::gateway::{IndexerDescriptor, MediaType, RawResult};

    /// Single-file torrent named `Heat.mkv` announcing `udp://tracker.example:80`.
    pub const TORRENT_SINGLE_FILE: &[u8] = b"d8:announce24:udp://tracker.example:804:infod6:lengthi1000e4:name8:Heat.mkv12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";

    /// Info hash of `TORRENT_SINGLE_FILE`.
    pub const TORRENT_SINGLE_FILE_HASH: &str = "3101688b6cb0154ec06633482f9154184b8de99b";

    /// Two-file torrent: `Show.S01E01.mkv` (100 bytes) and `Show.S01E02.mkv` (900 bytes).
    pub const TORRENT_MULTI_FILE: &[u8] = b"d8:announce24:udp://tracker.example:804:infod5:filesld6:lengthi100e4:pathl15:Show.S01E01.mkveed6:lengthi900e4:pathl15:Show.S01E02.mkveee4:name4:Show12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";

    /// A deterministic 40-character hex info hash derived from `seed`.
    pub fn info_hash(seed: &str) -> String {
        let mut hex: String = seed.bytes().map(|b| format!("{:02x}", b)).collect();
        hex.truncate(40);
        format!("{:0<40}", hex)
    }

    pub fn magnet(seed: &str) -> String {
        format!("magnet:?xt=urn:btih:{}&dn={}", info_hash(seed), seed)
    }

    /// Magnet carrying its own trackers.
    pub fn magnet_with_trackers(seed: &str, trackers: &[&str]) -> String {
        let mut uri = magnet(seed);
        for tracker in trackers {
            uri.push_str("&tr=");
            uri.push_str(&urlencoding::encode(tracker));
        }
        uri
    }

    /// A magnet-backed raw result from `mock-indexer`.
    pub fn raw_result(seed: &str, seeders: u32, size_bytes: u64) -> RawResult {
        RawResult {
            title: format!("Heat.1995.1080p.BluRay-{}", seed),
            link: None,
            magnet_uri: Some(magnet(seed)),
            seeders,
            peers: 50,
            size_bytes,
            published_at: None,
            source_indexer: "mock-indexer".to_string(),
            extra_tag: "1080p BluRay".to_string(),
        }
    }

    /// A raw result that only has a download link.
    pub fn raw_link_result(url: &str, seeders: u32, size_bytes: u64) -> RawResult {
        RawResult {
            title: "Heat.1995.1080p.BluRay".to_string(),
            link: Some(url.to_string()),
            magnet_uri: None,
            seeders,
            peers: 50,
            size_bytes,
            published_at: None,
            source_indexer: "mock-indexer".to_string(),
            extra_tag: "1080p BluRay".to_string(),
        }
    }

    /// An indexer supporting both movies and series.
    pub fn indexer(id: &str, host_url: &str) -> IndexerDescriptor {
        IndexerDescriptor {
            id: id.to_string(),
            supports_movie: true,
            supports_series: true,
            source_host: host_url.to_string(),
        }
    }

    pub fn stream(info_hash: &str, seeders: u32, sources: &[&str]) -> StreamDescriptor {
        StreamDescriptor {
            info_hash: info_hash.to_string(),
            file_idx: None,
            name: "Jackett\n1080p".to_string(),
            title: format!("stream {}", info_hash),
            tag: "1080p".to_string(),
            media_type: MediaType::Movie,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            seeders,
            behavior_hints: BehaviorHints {
                binge_group: format!("Jackett|1080p|{}", info_hash),
            },
        }
    }

    pub fn media_info(title: &str, year: Option<u32>) -> MediaInfo {
        MediaInfo::new(title, year)
    }
}
