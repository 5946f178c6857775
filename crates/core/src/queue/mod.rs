//! Bounded-concurrency resolution of raw results into torrent references.
//!
//! Magnet URIs resolve inline. http(s) links are downloaded by worker tasks,
//! at most `concurrency` at a time, and the result is parsed as a `.torrent`
//! file (or, for a redirect to a magnet, as a magnet URI).
//!
//! Every task checks the queue's cancellation token before it starts and
//! again after its network call returns. Once the token fires the task is a
//! no-op.

mod fetcher;

pub use fetcher::{FetchOutcome, HttpReferenceFetcher, ReferenceError, ReferenceFetcher};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::gateway::RawResult;
use crate::metrics;
use crate::resolver::{is_magnet, resolve_magnet, resolve_torrent, ResolvedReference};

/// Receives resolved references.
pub trait ResolvedSink: Send + Sync {
    fn accept(&self, raw: &RawResult, reference: ResolvedReference);
}

struct QueueInner {
    fetcher: Arc<dyn ReferenceFetcher>,
    sink: Arc<dyn ResolvedSink>,
    semaphore: Arc<Semaphore>,
    pending: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

/// Per-request worker pool.
pub struct ReferenceQueue {
    inner: Arc<QueueInner>,
}

impl ReferenceQueue {
    pub fn new(
        fetcher: Arc<dyn ReferenceFetcher>,
        sink: Arc<dyn ResolvedSink>,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                fetcher,
                sink,
                semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
                pending: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                cancel,
            }),
        }
    }

    /// Resolve a raw result. Magnets resolve before this returns; links are
    /// queued for a worker.
    pub fn push(&self, raw: RawResult) {
        if self.is_terminated() {
            return;
        }

        if let Some(uri) = raw.magnet() {
            resolve_magnet_into(self.inner.sink.as_ref(), &raw, uri);
            return;
        }

        let Some(url) = raw.http_link().map(str::to_string) else {
            debug!(title = %raw.title, "Result has no resolvable reference");
            return;
        };

        let pending = CountGuard::acquire(&self.inner.pending);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _pending = pending;
            inner.download(url, raw).await;
        });
    }

    /// No task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst) == 0
    }

    /// Downloads currently waiting on the network.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Queued or running tasks.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting work and abandon pending and running tasks.
    pub fn kill(&self) {
        self.inner.cancel.cancel();
        self.inner.semaphore.close();
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

impl QueueInner {
    async fn download(&self, url: String, raw: RawResult) {
        let _permit = tokio::select! {
            _ = self.cancel.cancelled() => return,
            permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };
        if self.cancel.is_cancelled() {
            return;
        }

        let outcome = {
            let _in_flight = CountGuard::acquire(&self.in_flight);
            debug!(url = %url, "Downloading reference");
            tokio::select! {
                _ = self.cancel.cancelled() => None,
                outcome = self.fetcher.fetch(&url) => Some(outcome),
            }
        };

        let outcome = match outcome {
            Some(outcome) if !self.cancel.is_cancelled() => outcome,
            _ => {
                debug!(url = %url, "Discarding reference after termination");
                metrics::REFERENCE_RESOLUTIONS
                    .with_label_values(&["torrent", "discarded"])
                    .inc();
                return;
            }
        };

        match outcome {
            Ok(FetchOutcome::Redirect(location)) if is_magnet(&location) => {
                debug!(url = %url, "Link redirected to magnet");
                resolve_magnet_into(self.sink.as_ref(), &raw, &location);
            }
            Ok(FetchOutcome::Redirect(location)) => {
                debug!(url = %url, location = %location, "Redirect is not a magnet link");
                metrics::REFERENCE_RESOLUTIONS
                    .with_label_values(&["torrent", "error"])
                    .inc();
            }
            Ok(FetchOutcome::Body(bytes)) => match resolve_torrent(&bytes) {
                Ok(reference) => {
                    metrics::REFERENCE_RESOLUTIONS
                        .with_label_values(&["torrent", "ok"])
                        .inc();
                    self.sink.accept(&raw, reference);
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Could not parse torrent");
                    metrics::REFERENCE_RESOLUTIONS
                        .with_label_values(&["torrent", "error"])
                        .inc();
                }
            },
            Err(e) => {
                debug!(url = %url, error = %e, "Error processing link");
                metrics::REFERENCE_RESOLUTIONS
                    .with_label_values(&["torrent", "error"])
                    .inc();
            }
        }
    }
}

fn resolve_magnet_into(sink: &dyn ResolvedSink, raw: &RawResult, uri: &str) {
    match resolve_magnet(uri) {
        Ok(reference) => {
            metrics::REFERENCE_RESOLUTIONS
                .with_label_values(&["magnet", "ok"])
                .inc();
            sink.accept(raw, reference);
        }
        Err(e) => {
            debug!(title = %raw.title, error = %e, "Could not parse magnet");
            metrics::REFERENCE_RESOLUTIONS
                .with_label_values(&["magnet", "error"])
                .inc();
        }
    }
}

/// Increments a counter and decrements it on drop.
struct CountGuard(Arc<AtomicUsize>);

impl CountGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for CountGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
