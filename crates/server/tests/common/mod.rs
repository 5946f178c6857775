//! Common test utilities for HTTP-level testing with mocks.
//!
//! Builds the full router in-process with a mocked gateway, metadata
//! catalog and link fetcher, so requests run the real aggregation
//! pipeline without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use jackett_relay_core::{
    config::{GatewayHost, SearchConfig},
    testing::{MockCatalog, MockGateway, MockReferenceFetcher},
    AggregatorSettings, Config, ResultAggregator, TrackerService, TrackerSet,
};
use jackett_relay_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use jackett_relay_core::testing::fixtures;

pub const HOST: &str = "http://jackett-test:9117/";
pub const HEAT: &str = "tt0113277";

/// Test fixture with controllable mocks behind a real router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_stream() {
///     let fixture = TestFixture::new().await;
///     fixture.gateway.set_results(HOST, "abc", vec![...]).await;
///
///     let response = fixture.get("/stream/movie/tt0113277.json").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Mock gateway - configure indexers and search results
    pub gateway: Arc<MockGateway>,
    /// Mock catalog - configure title/year lookups
    pub catalog: Arc<MockCatalog>,
    pub fetcher: Arc<MockReferenceFetcher>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with one gateway host exposing indexer "abc" and
    /// Heat (1995) in the catalog.
    pub async fn new() -> Self {
        let mut config = Config::default();
        config.addon.name = "Relay".to_string();
        config.gateway.hosts = vec![GatewayHost::new(HOST, "secret-key")];
        config.search = SearchConfig {
            response_timeout_ms: 1000,
            interval_ms: 20,
            minimum_seeds: 3,
            maximum_results: 5,
            ..Default::default()
        };

        let gateway = Arc::new(MockGateway::new());
        let catalog = Arc::new(MockCatalog::new());
        let fetcher = Arc::new(MockReferenceFetcher::new());

        gateway
            .set_indexers(HOST, vec![fixtures::indexer("abc", HOST)])
            .await;
        catalog
            .add(HEAT, fixtures::media_info("Heat", Some(1995)))
            .await;

        let aggregator = ResultAggregator::new(
            AggregatorSettings::from_config(&config),
            gateway.clone(),
            catalog.clone(),
            fetcher.clone(),
            Arc::new(TrackerService::fixed(TrackerSet::empty())),
        );

        let state = Arc::new(AppState::new(config, Arc::new(aggregator)));
        let router = create_router(state);

        Self {
            router,
            gateway,
            catalog,
            fetcher,
        }
    }

    /// Make a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}
