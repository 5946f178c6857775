//! Torznab gateway: indexer discovery and per-indexer search.

mod cache;
mod client;
mod feed;
mod types;

pub use cache::IndexerCache;
pub use client::GatewayClient;
pub use feed::{parse_indexers, parse_items, FeedItem, IndexerEntry};
pub use types::*;
