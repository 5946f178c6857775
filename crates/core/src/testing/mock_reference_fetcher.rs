//! Mock link fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::queue::{FetchOutcome, ReferenceError, ReferenceFetcher};

#[derive(Debug, Clone)]
enum MockFetch {
    Body(Vec<u8>),
    Redirect(String),
    Status(u16),
}

/// Mock implementation of the ReferenceFetcher trait.
///
/// Setters are synchronous so a fetcher can be configured before it is moved
/// into a queue. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MockReferenceFetcher {
    responses: Mutex<HashMap<String, MockFetch>>,
    fetched: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockReferenceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_body(&self, url: &str, body: Vec<u8>) {
        self.insert(url, MockFetch::Body(body));
    }

    pub fn add_redirect(&self, url: &str, location: &str) {
        self.insert(url, MockFetch::Redirect(location.to_string()));
    }

    pub fn add_status(&self, url: &str, status: u16) {
        self.insert(url, MockFetch::Status(status));
    }

    fn insert(&self, url: &str, fetch: MockFetch) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), fetch);
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReferenceFetcher for MockReferenceFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ReferenceError> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();

        match response {
            Some(MockFetch::Body(body)) => Ok(FetchOutcome::Body(body)),
            Some(MockFetch::Redirect(location)) => Ok(FetchOutcome::Redirect(location)),
            Some(MockFetch::Status(status)) => Err(ReferenceError::Status(status)),
            None => Err(ReferenceError::Status(404)),
        }
    }
}
