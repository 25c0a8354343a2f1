//! Search index endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::error::ServerError;
use crate::handlers::conditional_response;
use crate::state::AppState;

/// Handle GET /search-index.json.
pub(crate) async fn get_search_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let body = serde_json::to_vec(&state.renderer.search_index())?;
    Ok(conditional_response(
        &headers,
        &state.version,
        "application/json",
        body,
    ))
}
