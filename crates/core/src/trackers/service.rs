//! Holder of the current tracker snapshot.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{redirect, Client};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{build_tracker_set, parse_list, TrackerSet};
use crate::config::TrackersConfig;
use crate::metrics;

const LIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-wide tracker snapshot with an explicit load/refresh lifecycle.
pub struct TrackerService {
    config: TrackersConfig,
    client: Option<Client>,
    current: RwLock<Arc<TrackerSet>>,
}

impl TrackerService {
    /// Create a service with an empty snapshot. Call `refresh` to load.
    pub fn new(config: TrackersConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(LIST_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            config,
            client: Some(client),
            current: RwLock::new(Arc::new(TrackerSet::empty())),
        })
    }

    /// A service that always serves `set` and never downloads.
    pub fn fixed(set: TrackerSet) -> Self {
        Self {
            config: TrackersConfig::default(),
            client: None,
            current: RwLock::new(Arc::new(set)),
        }
    }

    pub async fn snapshot(&self) -> Arc<TrackerSet> {
        Arc::clone(&*self.current.read().await)
    }

    /// Rebuild the snapshot from the configured lists and swap it in.
    pub async fn refresh(&self) -> Arc<TrackerSet> {
        let Some(ref client) = self.client else {
            return self.snapshot().await;
        };

        let best = if self.config.add_best {
            fetch_list(client, &self.config.best_url).await
        } else {
            Vec::new()
        };
        let blacklist = if self.config.remove_blacklist {
            fetch_list(client, &self.config.blacklist_url).await
        } else {
            Vec::new()
        };

        let set = Arc::new(build_tracker_set(&self.config, best, blacklist));
        if !set.trackers().is_empty() {
            info!(
                trackers = set.trackers().len(),
                blacklisted = set.blacklist_len(),
                "Loaded trackers"
            );
        }

        *self.current.write().await = Arc::clone(&set);
        set
    }

    /// Refresh every `update_interval` until `cancel` fires.
    pub fn spawn_refresh(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let interval = self.config.update_interval();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Tracker refresh loop stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        self.refresh().await;
                    }
                }
            }
        })
    }
}

async fn fetch_list(client: &Client, url: &str) -> Vec<String> {
    let result = async {
        let response = client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
    .await;

    match result {
        Ok(text) => {
            metrics::EXTERNAL_SERVICE_REQUESTS
                .with_label_values(&["trackers", "ok"])
                .inc();
            let list = parse_list(&text);
            debug!(url = url, count = list.len(), "Downloaded tracker list");
            list
        }
        Err(e) => {
            metrics::EXTERNAL_SERVICE_REQUESTS
                .with_label_values(&["trackers", "error"])
                .inc();
            warn!(url = url, error = %e, "Error fetching tracker list");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_service_serves_its_set() {
        let set = TrackerSet::new(vec!["udp://a:1".to_string()], vec![]);
        let service = TrackerService::fixed(set.clone());

        assert_eq!(*service.snapshot().await, set);
        assert_eq!(*service.refresh().await, set);
    }

    #[tokio::test]
    async fn test_refresh_without_downloads_uses_static_lists() {
        let service = TrackerService::new(TrackersConfig {
            add_extra: true,
            ..Default::default()
        })
        .unwrap();
        assert!(service.snapshot().await.trackers().is_empty());

        let set = service.refresh().await;
        assert!(!set.trackers().is_empty());
        assert_eq!(service.snapshot().await.trackers(), set.trackers());
    }

    #[tokio::test]
    async fn test_refresh_loop_stops_on_cancel() {
        let service = Arc::new(TrackerService::fixed(TrackerSet::empty()));
        let cancel = CancellationToken::new();
        let handle = Arc::clone(&service).spawn_refresh(cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
