//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{pages, search};
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// Unmatched paths fall through to the record handler, which accepts
/// `/adr-NNNN` and `/adr-NNNN.html` and answers 404 for anything else.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::get_index))
        .route("/index.html", get(pages::get_index))
        .route("/search", get(pages::get_search))
        .route("/search.html", get(pages::get_search))
        .route("/docs", get(pages::get_docs))
        .route("/docs.html", get(pages::get_docs))
        .route("/search-index.json", get(search::get_search_index));

    let router = Router::new()
        .merge(page_routes)
        .merge(static_files::static_router())
        .fallback(pages::get_adr);

    security::with_security_headers(router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
