//! Mock Torznab gateway for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::GatewayHost;
use crate::gateway::{Gateway, GatewayError, IndexerDescriptor, RawResult, SearchQuery};

/// A recorded indexer search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedIndexerSearch {
    pub host: String,
    pub indexer: String,
    pub query: SearchQuery,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Results(Vec<RawResult>),
    Delayed(Duration, Vec<RawResult>),
    Error,
    Hang,
}

/// Mock implementation of the Gateway trait.
///
/// Catalogs are keyed by host URL and responses by (host URL, indexer id).
/// A pair with no configured response returns no results.
///
/// # Example
///
/// ```rust,ignore
/// let gateway = MockGateway::new();
/// gateway.set_indexers("http://a/", vec![fixtures::indexer("x", "http://a/")]).await;
/// gateway.set_hang("http://a/", "x").await;
/// ```
#[derive(Debug, Default)]
pub struct MockGateway {
    catalogs: Arc<RwLock<HashMap<String, Vec<IndexerDescriptor>>>>,
    responses: Arc<RwLock<HashMap<(String, String), MockResponse>>>,
    searches: Arc<RwLock<Vec<RecordedIndexerSearch>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indexer catalog reported by `host_url`.
    pub async fn set_indexers(&self, host_url: &str, indexers: Vec<IndexerDescriptor>) {
        self.catalogs
            .write()
            .await
            .insert(host_url.to_string(), indexers);
    }

    pub async fn set_results(&self, host_url: &str, indexer: &str, results: Vec<RawResult>) {
        self.respond(host_url, indexer, MockResponse::Results(results))
            .await;
    }

    /// Return `results` after `delay`.
    pub async fn set_delayed(
        &self,
        host_url: &str,
        indexer: &str,
        delay: Duration,
        results: Vec<RawResult>,
    ) {
        self.respond(host_url, indexer, MockResponse::Delayed(delay, results))
            .await;
    }

    pub async fn set_error(&self, host_url: &str, indexer: &str) {
        self.respond(host_url, indexer, MockResponse::Error).await;
    }

    /// Never answer.
    pub async fn set_hang(&self, host_url: &str, indexer: &str) {
        self.respond(host_url, indexer, MockResponse::Hang).await;
    }

    async fn respond(&self, host_url: &str, indexer: &str, response: MockResponse) {
        self.responses
            .write()
            .await
            .insert((host_url.to_string(), indexer.to_string()), response);
    }

    pub async fn recorded_searches(&self) -> Vec<RecordedIndexerSearch> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_indexers(&self, host: &GatewayHost) -> Vec<IndexerDescriptor> {
        self.catalogs
            .read()
            .await
            .get(&host.url)
            .cloned()
            .unwrap_or_default()
    }

    async fn search_indexer(
        &self,
        host: &GatewayHost,
        indexer: &IndexerDescriptor,
        query: &SearchQuery,
    ) -> Result<Vec<RawResult>, GatewayError> {
        self.searches.write().await.push(RecordedIndexerSearch {
            host: host.url.clone(),
            indexer: indexer.id.clone(),
            query: query.clone(),
        });

        let response = self
            .responses
            .read()
            .await
            .get(&(host.url.clone(), indexer.id.clone()))
            .cloned();

        match response {
            None => Ok(Vec::new()),
            Some(MockResponse::Results(results)) => Ok(results),
            Some(MockResponse::Delayed(delay, results)) => {
                tokio::time::sleep(delay).await;
                Ok(results)
            }
            Some(MockResponse::Error) => Err(GatewayError::UpstreamUnavailable(format!(
                "mock failure for {}",
                indexer.id
            ))),
            Some(MockResponse::Hang) => futures::future::pending().await,
        }
    }
}
