//! Process-wide, per-host cache of indexer catalogs.
//!
//! Shared across concurrent requests. Concurrent refreshes of the same host
//! are tolerated: the last write wins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::IndexerDescriptor;

#[derive(Debug)]
struct CachedCatalog {
    indexers: Vec<IndexerDescriptor>,
    expires_at: Instant,
}

/// TTL cache keyed by host URL.
#[derive(Debug)]
pub struct IndexerCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedCatalog>>,
}

impl IndexerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached catalog for `host`, if present and not expired.
    pub async fn get(&self, host: &str) -> Option<Vec<IndexerDescriptor>> {
        let entries = self.entries.read().await;
        entries
            .get(host)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.indexers.clone())
    }

    pub async fn insert(&self, host: &str, indexers: Vec<IndexerDescriptor>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            host.to_string(),
            CachedCatalog {
                indexers,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every cached catalog.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
