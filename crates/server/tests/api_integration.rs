//! HTTP-level tests against the in-process router with mocked upstreams.

mod common;

use axum::http::{header, StatusCode};
use common::{fixtures, TestFixture, HEAT, HOST};

const CACHE_CONTROL: &str =
    "max-age=7200, stale-while-revalidate=14400, stale-if-error=604800, public";

#[tokio::test]
async fn test_manifest_uses_configured_name() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/manifest.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "org.stremio.jackett");
    assert_eq!(response.body["name"], "Relay");
    assert_eq!(response.body["idPrefixes"][0], "tt");
    assert_eq!(response.headers[header::CACHE_CONTROL], CACHE_CONTROL);
}

#[tokio::test]
async fn test_stream_returns_ranked_results() {
    let fixture = TestFixture::new().await;
    fixture
        .gateway
        .set_results(
            HOST,
            "abc",
            vec![
                fixtures::raw_result("low", 4, 1000),
                fixtures::raw_result("high", 40, 1000),
                fixtures::raw_result("dead", 0, 1000),
            ],
        )
        .await;

    let response = fixture.get(&format!("/stream/movie/{}.json", HEAT)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CACHE_CONTROL], CACHE_CONTROL);
    assert_eq!(response.body["cacheMaxAge"], 1440);

    let streams = response.body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0]["infoHash"], fixtures::info_hash("high"));
    assert_eq!(streams[0]["seeders"], 40);
    assert_eq!(streams[0]["type"], "movie");
    assert!(streams[0]["name"].as_str().unwrap().starts_with("Relay\n"));
    assert!(streams[0]["title"].as_str().unwrap().starts_with("Heat 1995"));
    assert_eq!(streams[1]["infoHash"], fixtures::info_hash("low"));
}

#[tokio::test]
async fn test_stream_for_episode_reaches_gateway() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .add("tt0903747", fixtures::media_info("Breaking Bad", None))
        .await;

    let response = fixture.get("/stream/series/tt0903747:5:14.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["streams"], serde_json::json!([]));
    let searches = fixture.gateway.recorded_searches().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(fixture.catalog.lookups().await, vec!["tt0903747"]);
}

#[tokio::test]
async fn test_unsupported_type_returns_empty_streams() {
    let fixture = TestFixture::new().await;

    let response = fixture.get(&format!("/stream/channel/{}.json", HEAT)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["streams"], serde_json::json!([]));
    assert_eq!(response.headers[header::CACHE_CONTROL], CACHE_CONTROL);
    assert_eq!(fixture.gateway.search_count().await, 0);
}

#[tokio::test]
async fn test_malformed_id_returns_empty_streams() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/stream/series/tt0903747:five:1.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["streams"], serde_json::json!([]));
    assert!(fixture.catalog.lookups().await.is_empty());
}

#[tokio::test]
async fn test_catalog_failure_returns_empty_streams() {
    let fixture = TestFixture::new().await;
    fixture.catalog.set_failing(true).await;

    let response = fixture.get(&format!("/stream/movie/{}.json", HEAT)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["streams"], serde_json::json!([]));
    assert_eq!(fixture.gateway.search_count().await, 0);
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_keys() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.text.contains("secret-key"));
    assert_eq!(response.body["gateway"]["hosts"][0]["url"], HOST);
    assert_eq!(
        response.body["gateway"]["hosts"][0]["api_key_configured"],
        true
    );
    assert_eq!(response.body["addon"]["name"], "Relay");
}

#[tokio::test]
async fn test_metrics_after_stream_request() {
    let fixture = TestFixture::new().await;
    fixture.get("/stream/movie/tt0000000:x.json").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("jackett_relay_http_requests_total"));
    assert!(response.text.contains("jackett_relay_stream_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/tickets").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
