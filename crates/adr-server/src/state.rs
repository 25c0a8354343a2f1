//! Application state.

use std::path::PathBuf;

use adr_site::PageRenderer;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Renderer over the collection loaded at startup.
    pub(crate) renderer: PageRenderer,
    /// Project static directory, checked before the embedded assets.
    pub(crate) static_dir: Option<PathBuf>,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}
