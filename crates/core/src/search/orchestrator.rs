//! Fan-out of one query across every configured host and indexer.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{GatewayHost, SearchConfig};
use crate::gateway::{Gateway, IndexerDescriptor, RawResult, SearchQuery};
use crate::metrics;

use super::topk::TopK;
use super::types::{IngestFilter, SearchEvent};

/// Runs one search across all hosts and streams filtered batches.
pub struct SearchOrchestrator {
    gateway: Arc<dyn Gateway>,
    hosts: Vec<GatewayHost>,
    filter: IngestFilter,
    maximum_results: usize,
}

impl SearchOrchestrator {
    pub fn new(gateway: Arc<dyn Gateway>, hosts: Vec<GatewayHost>, config: &SearchConfig) -> Self {
        Self {
            gateway,
            hosts,
            filter: IngestFilter::from_config(config),
            maximum_results: config.maximum_results,
        }
    }

    /// Search every (host, indexer) pair concurrently.
    ///
    /// Each search that yields admitted results is sent as one
    /// `SearchEvent::Batch`. `SearchEvent::Complete` is sent exactly once when
    /// every search has settled or `cancel` fired. Send failures (the receiver
    /// is gone) are ignored.
    pub async fn search(
        &self,
        query: SearchQuery,
        cancel: CancellationToken,
        tx: mpsc::UnboundedSender<SearchEvent>,
    ) {
        self.run(&query, &cancel, &tx).await;
        let _ = tx.send(SearchEvent::Complete);
        debug!(title = %query.title, "Search finished");
    }

    async fn run(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
        tx: &mpsc::UnboundedSender<SearchEvent>,
    ) {
        let catalogs = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Search cancelled while loading indexer catalogs");
                return;
            }
            catalogs = futures::future::join_all(
                self.hosts.iter().map(|host| self.gateway.fetch_indexers(host)),
            ) => catalogs,
        };

        let pairs = claim_indexers(&self.hosts, catalogs, query);
        if pairs.is_empty() {
            warn!(title = %query.title, "No indexers available for search");
            return;
        }
        info!(indexers = pairs.len(), title = %query.title, "Searching indexers");

        let mut searches: FuturesUnordered<_> = pairs
            .iter()
            .map(|(host, indexer)| async move {
                let result = self.gateway.search_indexer(host, indexer, query).await;
                (*host, indexer, result)
            })
            .collect();

        let mut top = TopK::new(self.maximum_results);
        let mut finished = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(finished = finished, total = pairs.len(), "Search cancelled");
                    return;
                }
                next = searches.next() => next,
            };

            let Some((host, indexer, result)) = next else {
                break;
            };
            finished += 1;

            match result {
                Ok(results) => {
                    let batch = self.ingest(results, &mut top);
                    debug!(
                        indexer = %indexer.id,
                        host = %host.url,
                        admitted = batch.len(),
                        finished = finished,
                        total = pairs.len(),
                        "Indexer search settled"
                    );
                    if !batch.is_empty() {
                        let _ = tx.send(SearchEvent::Batch(batch));
                    }
                }
                Err(e) => {
                    warn!(indexer = %indexer.id, host = %host.url, error = %e, "Indexer search failed");
                }
            }
        }
    }

    /// Filter one indexer's results and admit them through the shared top-K.
    fn ingest(&self, results: Vec<RawResult>, top: &mut TopK<()>) -> Vec<RawResult> {
        let mut batch = Vec::new();
        for raw in results {
            if let Err(rejection) = self.filter.check(&raw) {
                metrics::RESULTS_FILTERED
                    .with_label_values(&[rejection.as_str()])
                    .inc();
                continue;
            }
            if top.offer(raw.seeders, ()) {
                batch.push(raw);
            } else {
                metrics::RESULTS_FILTERED
                    .with_label_values(&["ranked_out"])
                    .inc();
            }
        }
        batch
    }
}

/// Pair each indexer with the first host (in configuration order) that lists it.
///
/// Indexers that do not support the query's media type are skipped.
fn claim_indexers<'a>(
    hosts: &'a [GatewayHost],
    catalogs: Vec<Vec<IndexerDescriptor>>,
    query: &SearchQuery,
) -> Vec<(&'a GatewayHost, IndexerDescriptor)> {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut pairs = Vec::new();

    for (host, catalog) in hosts.iter().zip(catalogs) {
        for indexer in catalog {
            if !indexer.supports(query.media_type) {
                debug!(indexer = %indexer.id, media_type = query.media_type.as_str(), "Skipping indexer without category");
                continue;
            }
            if !claimed.insert(indexer.id.clone()) {
                debug!(indexer = %indexer.id, host = %host.url, "Skipping indexer already claimed by another host");
                continue;
            }
            pairs.push((host, indexer));
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::indexer;

    #[test]
    fn test_claim_first_host_wins() {
        let hosts = vec![
            GatewayHost::new("http://one:9117", "k1"),
            GatewayHost::new("http://two:9117", "k2"),
        ];
        let catalogs = vec![
            vec![indexer("abc", &hosts[0].url)],
            vec![indexer("abc", &hosts[1].url), indexer("xyz", &hosts[1].url)],
        ];
        let query = SearchQuery::movie("Heat", Some(1995));

        let pairs = claim_indexers(&hosts, catalogs, &query);
        let claimed: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(h, i)| (h.url.as_str(), i.id.as_str()))
            .collect();
        assert_eq!(
            claimed,
            vec![("http://one:9117/", "abc"), ("http://two:9117/", "xyz")]
        );
    }

    #[test]
    fn test_claim_skips_unsupported_media_type() {
        let hosts = vec![GatewayHost::new("http://one:9117", "k1")];
        let mut tv_only = indexer("eztv", &hosts[0].url);
        tv_only.supports_movie = false;

        let pairs = claim_indexers(
            &hosts,
            vec![vec![tv_only]],
            &SearchQuery::movie("Heat", Some(1995)),
        );
        assert!(pairs.is_empty());
    }
}
