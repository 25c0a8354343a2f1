//! HTML page endpoints.
//!
//! Pages are rendered into the response body through the shared
//! [`PageRenderer`](adr_site::PageRenderer), so repeated requests for an
//! unchanged page are served from the render cache.

use std::sync::Arc;

use adr_site::PageKind;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;

use crate::error::ServerError;
use crate::handlers::conditional_response;
use crate::state::AppState;

const HTML: &str = "text/html; charset=utf-8";

/// Handle GET / and /index.html.
pub(crate) async fn get_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    render_page(&state, &PageKind::Index, &headers)
}

/// Handle GET /search and /search.html.
pub(crate) async fn get_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    render_page(&state, &PageKind::Search, &headers)
}

/// Handle GET /docs and /docs.html.
pub(crate) async fn get_docs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    render_page(&state, &PageKind::Docs, &headers)
}

/// Fallback handler for `/adr-NNNN` and `/adr-NNNN.html`.
///
/// Any other unmatched path is a 404.
pub(crate) async fn get_adr(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = uri.path();
    let number = parse_adr_path(path).ok_or_else(|| ServerError::PageNotFound(path.to_owned()))?;
    render_page(&state, &PageKind::Adr(number.to_owned()), &headers)
}

fn render_page(
    state: &AppState,
    kind: &PageKind,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let mut body = Vec::new();
    let outcome = state.renderer.render_to(kind, &mut body)?;
    tracing::debug!(
        key = %outcome.cache_key,
        cached = outcome.from_cache,
        bytes = outcome.bytes_written,
        "Served page"
    );
    Ok(conditional_response(headers, &state.version, HTML, body))
}

/// Extract the record number from `/adr-NNNN` or `/adr-NNNN.html`.
fn parse_adr_path(path: &str) -> Option<&str> {
    let name = path.strip_prefix('/')?;
    let name = name.strip_suffix(".html").unwrap_or(name);
    let number = name.strip_prefix("adr-")?;
    (number.len() == 4 && number.bytes().all(|b| b.is_ascii_digit())).then_some(number)
}
