//! Per-request aggregation: metadata lookup, fan-out search, reference
//! resolution and finalization into a ranked stream list.
//!
//! A request moves through `Collecting -> Finalizing -> Done`. While
//! collecting, search batches feed the reference queue and resolved
//! references become streams in the session. A periodic check finalizes the
//! session once the deadline has passed, or once the search is complete and
//! no download is queued or running.

mod dedup;
mod session;
mod stream;
mod types;

pub use dedup::finalize_streams;
pub use session::Session;
pub use stream::{
    binge_group, build_stream, display_title, select_file_index, stream_sources, StreamContext,
};
pub use types::*;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::additional::AdditionalSources;
use crate::catalog::CatalogLookup;
use crate::config::{Config, GatewayHost, SearchConfig};
use crate::gateway::Gateway;
use crate::metrics;
use crate::queue::{ReferenceFetcher, ReferenceQueue};
use crate::search::{SearchEvent, SearchOrchestrator};
use crate::trackers::TrackerService;

/// Settings the aggregator needs from the root config.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub addon_name: String,
    pub hosts: Vec<GatewayHost>,
    pub search: SearchConfig,
}

impl AggregatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            addon_name: config.addon.name.clone(),
            hosts: config.gateway.hosts.clone(),
            search: config.search.clone(),
        }
    }
}

/// Answers stream requests.
pub struct ResultAggregator {
    settings: AggregatorSettings,
    gateway: Arc<dyn Gateway>,
    catalog: Arc<dyn CatalogLookup>,
    fetcher: Arc<dyn ReferenceFetcher>,
    trackers: Arc<TrackerService>,
    additional: Option<Arc<AdditionalSources>>,
}

impl ResultAggregator {
    pub fn new(
        settings: AggregatorSettings,
        gateway: Arc<dyn Gateway>,
        catalog: Arc<dyn CatalogLookup>,
        fetcher: Arc<dyn ReferenceFetcher>,
        trackers: Arc<TrackerService>,
    ) -> Self {
        Self {
            settings,
            gateway,
            catalog,
            fetcher,
            trackers,
            additional: None,
        }
    }

    /// Merge streams from other add-ons into every response.
    pub fn with_additional_sources(mut self, additional: Arc<AdditionalSources>) -> Self {
        if !additional.is_empty() {
            self.additional = Some(additional);
        }
        self
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Produce the response for one request. Never fails: every upstream
    /// error degrades to fewer (or zero) streams.
    pub async fn handle(&self, request: StreamRequest) -> StreamsResponse {
        let started = Instant::now();
        let deadline = started + self.settings.search.response_timeout();

        let lookup = tokio::time::timeout_at(
            deadline,
            self.catalog.lookup(request.media_type, &request.imdb_id),
        )
        .await;
        let info = match lookup {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                warn!(imdb_id = %request.imdb_id, error = %e, "Metadata lookup failed");
                return record_empty(started, "catalog_failed");
            }
            Err(_) => {
                warn!(imdb_id = %request.imdb_id, "Metadata lookup timed out");
                return record_empty(started, "catalog_failed");
            }
        };

        let query = request.to_query(&info);
        info!(
            imdb_id = %request.imdb_id,
            title = %query.title,
            media_type = query.media_type.as_str(),
            year = ?query.year,
            season = ?query.season,
            episode = ?query.episode,
            "Q"
        );

        let trackers = self.trackers.snapshot().await;
        let session = Arc::new(Session::new(StreamContext {
            query: query.clone(),
            addon_name: self.settings.addon_name.clone(),
            search_by_year: self.settings.search.search_by_year,
            trackers: Arc::clone(&trackers),
        }));

        // Cancels the search, downloads and additional sources if this
        // future is dropped before finalizing.
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let queue = ReferenceQueue::new(
            Arc::clone(&self.fetcher),
            session.clone(),
            self.settings.search.download_torrent_queue,
            cancel.child_token(),
        );

        self.spawn_additional_sources(&request, &session, &cancel);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let orchestrator = SearchOrchestrator::new(
            Arc::clone(&self.gateway),
            self.settings.hosts.clone(),
            &self.settings.search,
        );
        let search_cancel = cancel.clone();
        tokio::spawn(async move {
            orchestrator.search(query, search_cancel, tx).await;
        });

        let poll = self.settings.search.interval();
        let mut ticker = interval_at(started + poll, poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut search_complete = false;

        let reason = loop {
            tokio::select! {
                event = rx.recv(), if !search_complete => match event {
                    Some(SearchEvent::Batch(results)) => {
                        debug!(count = results.len(), "Search batch");
                        for raw in results {
                            queue.push(raw);
                        }
                    }
                    Some(SearchEvent::Complete) | None => search_complete = true,
                },
                _ = ticker.tick() => {
                    let now = Instant::now();
                    if now >= deadline {
                        break FinalizeReason::Deadline;
                    }
                    if search_complete && queue.is_idle() && queue.in_flight() == 0 {
                        break FinalizeReason::Completed;
                    }
                    debug!(
                        imdb_id = %request.imdb_id,
                        remaining_ms = deadline.saturating_duration_since(now).as_millis() as u64,
                        search_complete,
                        pending = queue.pending(),
                        collected = session.collected(),
                        "S"
                    );
                }
            }
        };

        let collected = session.terminate();
        cancel.cancel();
        queue.kill();

        let total = collected.len();
        let streams = finalize_streams(collected, self.settings.search.maximum_results);
        session.finish();

        info!(
            imdb_id = %request.imdb_id,
            results = streams.len(),
            timed_out = reason == FinalizeReason::Deadline,
            search_complete,
            queue_idle = queue.is_idle(),
            pending_downloads = queue.in_flight(),
            discarded = total - streams.len(),
            "A"
        );

        let outcome = if streams.is_empty() { "empty" } else { "results" };
        metrics::FINALIZE_REASONS
            .with_label_values(&[reason.as_str()])
            .inc();
        record(started, outcome, streams.len());

        StreamsResponse::new(streams)
    }

    fn spawn_additional_sources(
        &self,
        request: &StreamRequest,
        session: &Arc<Session>,
        cancel: &CancellationToken,
    ) {
        let Some(ref additional) = self.additional else {
            return;
        };

        for source in additional.sources().iter().cloned() {
            let additional = Arc::clone(additional);
            let session = Arc::clone(session);
            let request = request.clone();
            let cancel = cancel.clone();
            let minimum_seeds = self.settings.search.minimum_seeds;

            tokio::spawn(async move {
                let trackers = Arc::clone(&session.context().trackers);
                let result = tokio::select! {
                    _ = cancel.cancelled() => return,
                    result = additional.fetch(&source, &request, &trackers, minimum_seeds) => result,
                };
                match result {
                    Ok(streams) => {
                        for stream in streams {
                            if !session.push(stream) {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        debug!(source = %source.name, error = %e, "Error finding additional streams");
                    }
                }
            });
        }
    }
}

fn record(started: Instant, outcome: &str, streams: usize) {
    metrics::STREAM_REQUESTS.with_label_values(&[outcome]).inc();
    metrics::STREAM_REQUEST_DURATION
        .with_label_values(&[outcome])
        .observe(started.elapsed().as_secs_f64());
    metrics::STREAMS_RETURNED
        .with_label_values(&[])
        .observe(streams as f64);
}

fn record_empty(started: Instant, outcome: &str) -> StreamsResponse {
    record(started, outcome, 0);
    StreamsResponse::empty()
}
