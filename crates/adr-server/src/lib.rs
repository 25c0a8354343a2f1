//! Development server for the ADR site generator.
//!
//! Serves the same pages as the static build, rendered on demand through
//! [`adr_site::PageRenderer`]. The collection is loaded once at startup;
//! restart the server to pick up changed records.
//!
//! # Routes
//!
//! | Path                            | Response                          |
//! |---------------------------------|-----------------------------------|
//! | `/`, `/index.html`              | Index page                        |
//! | `/adr-NNNN`, `/adr-NNNN.html`   | Single record (404 when unknown)  |
//! | `/search`, `/search.html`       | Search page                       |
//! | `/search-index.json`            | Search index                      |
//! | `/docs`, `/docs.html`           | Project README                    |
//! | `/static/{*path}`               | Static directory, then embedded assets |
//!
//! # Quick Start
//!
//! ```ignore
//! use adr_server::{ServerConfig, run_server};
//! use adr_site::SiteConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::new(SiteConfig::new("adr"));
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use adr_cache::{Cache, MemoryCache, NullCache};
use adr_site::{PageRenderer, SiteConfig, load_collection};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Loading and rendering settings.
    pub site: SiteConfig,
    /// Directory served under `/static/` before the embedded assets.
    pub static_dir: Option<PathBuf>,
    /// Application version, mixed into `ETag` values.
    pub version: String,
}

impl ServerConfig {
    /// Configuration listening on `127.0.0.1:8080`.
    #[must_use]
    pub fn new(site: SiteConfig) -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            site,
            static_dir: None,
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the records cannot be loaded, the templates fail to
/// compile, or the address cannot be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(build_state(&config)?);
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_state(config: &ServerConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let collection = Arc::new(load_collection(&config.site.source_dir, &config.site)?);
    tracing::info!(
        adrs = collection.len(),
        skipped = collection.skipped().len(),
        "Loaded records"
    );

    let cache: Box<dyn Cache> = if config.site.cache_enabled {
        Box::new(MemoryCache::new())
    } else {
        Box::new(NullCache)
    };
    let renderer = PageRenderer::new(collection, &config.site, cache.as_ref())?;

    Ok(AppState {
        renderer,
        static_dir: config.static_dir.clone(),
        version: config.version.clone(),
    })
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
