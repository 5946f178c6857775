//! Cinemeta API client.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{CatalogError, CatalogLookup, MediaInfo};
use crate::gateway::MediaType;
use crate::metrics;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").unwrap());

#[derive(Debug, Deserialize)]
struct MetaResponse {
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    name: Option<String>,
    year: Option<serde_json::Value>,
    #[serde(rename = "releaseInfo")]
    release_info: Option<serde_json::Value>,
}

/// Cinemeta client.
pub struct CinemetaClient {
    client: Client,
    base_url: String,
}

impl CinemetaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn meta_url(&self, media_type: MediaType, imdb_id: &str) -> String {
        format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            media_type.as_str(),
            urlencoding::encode(imdb_id)
        )
    }

    async fn fetch(&self, media_type: MediaType, imdb_id: &str) -> Result<MediaInfo, CatalogError> {
        let url = self.meta_url(media_type, imdb_id);
        debug!(url = %url, "Cinemeta lookup");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
            });
        }

        let body: MetaResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        media_info_from(body).ok_or_else(|| CatalogError::NotFound(imdb_id.to_string()))
    }
}

#[async_trait]
impl CatalogLookup for CinemetaClient {
    async fn lookup(
        &self,
        media_type: MediaType,
        imdb_id: &str,
    ) -> Result<MediaInfo, CatalogError> {
        let result = self.fetch(media_type, imdb_id).await;
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["cinemeta", if result.is_ok() { "ok" } else { "error" }])
            .inc();
        result
    }
}

fn media_info_from(body: MetaResponse) -> Option<MediaInfo> {
    let meta = body.meta?;
    let title = meta.name.filter(|n| !n.trim().is_empty())?;

    let year = meta
        .year
        .as_ref()
        .and_then(first_year)
        .or_else(|| meta.release_info.as_ref().and_then(first_year));

    Some(MediaInfo { title, year })
}

/// First four-digit run in a string or number value.
fn first_year(value: &serde_json::Value) -> Option<u32> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    YEAR.find(&text).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<MediaInfo> {
        media_info_from(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_meta_url() {
        let client =
            CinemetaClient::new("https://v3-cinemeta.strem.io/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.meta_url(MediaType::Series, "tt0903747"),
            "https://v3-cinemeta.strem.io/meta/series/tt0903747.json"
        );
    }

    #[test]
    fn test_media_info_from_year() {
        let info = parse(r#"{"meta":{"name":"Heat","year":"1995"}}"#).unwrap();
        assert_eq!(info, MediaInfo::new("Heat", Some(1995)));
    }

    #[test]
    fn test_media_info_from_release_info_range() {
        let info = parse(r#"{"meta":{"name":"Breaking Bad","releaseInfo":"2008-2013"}}"#).unwrap();
        assert_eq!(info.year, Some(2008));
    }

    #[test]
    fn test_media_info_numeric_year() {
        let info = parse(r#"{"meta":{"name":"Heat","year":1995}}"#).unwrap();
        assert_eq!(info.year, Some(1995));
    }

    #[test]
    fn test_media_info_missing_name() {
        assert!(parse(r#"{"meta":{"year":"1995"}}"#).is_none());
        assert!(parse(r#"{}"#).is_none());
    }
}
