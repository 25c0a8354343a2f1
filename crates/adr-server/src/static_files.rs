//! Static file serving.
//!
//! Files under `/static/` come from the project static directory when it
//! holds them, otherwise from the assets embedded in `adr-assets`.

use std::io;
use std::path::Component;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;

use crate::error::ServerError;
use crate::handlers::conditional_response;
use crate::state::AppState;

/// Create router for `/static/{*path}`.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().route("/static/{*path}", get(serve_static))
}

async fn serve_static(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if !is_safe_path(&path) {
        tracing::warn!(path = %path, "Rejected static path");
        return Err(ServerError::Forbidden(path));
    }
    let mime = adr_assets::mime_for(&path);

    if let Some(dir) = &state.static_dir {
        match tokio::fs::read(dir.join(&path)).await {
            Ok(body) => return Ok(conditional_response(&headers, &state.version, mime, body)),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let content = adr_assets::get(&path).ok_or_else(|| ServerError::FileNotFound(path.clone()))?;
    Ok(conditional_response(
        &headers,
        &state.version,
        mime,
        content.into_owned(),
    ))
}

/// Relative path made of plain segments only.
fn is_safe_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && std::path::Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
