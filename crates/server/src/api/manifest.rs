//! Stremio add-on manifest.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::CACHE_CONTROL;
use crate::state::AppState;

const MANIFEST_ID: &str = "org.stremio.jackett";
const DESCRIPTION: &str = "Stremio Add-on to get torrent results from Jackett";
const ICON: &str = "https://images.squarespace-cdn.com/content/55c17e7ae4b08ccd27be814e/1503363523826-E9M5KDF7RCQ805Y7TQ6H/Jackett-logo-2.jpg";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    pub name: &'static str,
    pub types: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: String,
    pub description: &'static str,
    pub icon: &'static str,
    pub resources: Vec<ManifestResource>,
    pub types: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
    pub catalogs: Vec<serde_json::Value>,
}

impl Manifest {
    pub fn new(addon_name: &str) -> Self {
        Self {
            id: MANIFEST_ID,
            version: env!("CARGO_PKG_VERSION"),
            name: addon_name.to_string(),
            description: DESCRIPTION,
            icon: ICON,
            resources: vec![ManifestResource {
                name: "stream",
                types: vec!["movie", "series"],
                id_prefixes: vec!["tt"],
            }],
            types: vec!["movie", "series"],
            id_prefixes: vec!["tt"],
            catalogs: Vec::new(),
        }
    }
}

pub async fn get_manifest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Sending manifest");
    (
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(Manifest::new(&state.config().addon.name)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_wire_format() {
        let json = serde_json::to_value(Manifest::new("Relay")).unwrap();
        assert_eq!(json["id"], "org.stremio.jackett");
        assert_eq!(json["name"], "Relay");
        assert_eq!(json["resources"][0]["name"], "stream");
        assert_eq!(json["resources"][0]["idPrefixes"][0], "tt");
        assert_eq!(json["types"], serde_json::json!(["movie", "series"]));
        assert_eq!(json["catalogs"], serde_json::json!([]));
    }
}
