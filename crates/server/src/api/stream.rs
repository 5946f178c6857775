//! `GET /stream/{type}/{id}.json`.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use jackett_relay_core::{metrics, MediaType, StreamRequest, StreamsResponse};

use super::CACHE_CONTROL;
use crate::state::AppState;

/// Answer a stream request. Unsupported types and malformed ids get an
/// empty stream list, never an error status.
pub async fn get_streams(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, String)>,
) -> impl IntoResponse {
    let request = media_type
        .parse::<MediaType>()
        .map_err(|e| e.to_string())
        .and_then(|media_type| StreamRequest::parse(media_type, &id).map_err(|e| e.to_string()));

    let response = match request {
        Ok(request) => {
            let span = info_span!(
                "stream",
                request_id = %Uuid::new_v4(),
                media_type = request.media_type.as_str(),
                id = %request.stream_id()
            );
            state.aggregator().handle(request).instrument(span).await
        }
        Err(e) => {
            debug!(media_type = %media_type, id = %id, error = %e, "Rejecting stream request");
            metrics::STREAM_REQUESTS.with_label_values(&["invalid"]).inc();
            StreamsResponse::empty()
        }
    };

    ([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(response))
}
