//! Mock metadata catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, CatalogLookup, MediaInfo};
use crate::gateway::MediaType;

/// Mock implementation of the CatalogLookup trait.
///
/// Unknown ids fail with `NotFound`. A configured delay applies to every
/// lookup, and `set_failing(true)` makes every lookup fail.
#[derive(Debug, Default)]
pub struct MockCatalog {
    entries: Arc<RwLock<HashMap<String, MediaInfo>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    failing: Arc<RwLock<bool>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, imdb_id: &str, info: MediaInfo) {
        self.entries
            .write()
            .await
            .insert(imdb_id.to_string(), info);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    /// Ids looked up so far.
    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl CatalogLookup for MockCatalog {
    async fn lookup(
        &self,
        _media_type: MediaType,
        imdb_id: &str,
    ) -> Result<MediaInfo, CatalogError> {
        self.lookups.write().await.push(imdb_id.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.read().await {
            return Err(CatalogError::ApiError { status: 503 });
        }

        self.entries
            .read()
            .await
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(imdb_id.to_string()))
    }
}
