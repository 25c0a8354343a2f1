//! Static site generation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use adr_cache::{Cache, MemoryCache, NullCache};

use crate::loader::{LoadError, load_collection};
use crate::renderer::{PageKind, PageRenderer, RenderError};
use crate::settings::SiteConfig;

/// Name of the search index file in the output directory.
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

/// Error building the site.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize search index: {0}")]
    Json(#[from] serde_json::Error),
}

/// Statistics of one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub adr_count: usize,
    /// HTML pages written.
    pub page_count: usize,
    /// Static files written.
    pub asset_count: usize,
    pub diagram_count: usize,
}

/// Builds a static site from a record directory.
///
/// Writes `index.html`, one `adr-NNNN.html` per record, `search.html`,
/// `docs.html` when the README exists, `search-index.json` and the static
/// assets. The project static directory is copied to `<output>/static/`;
/// without one the embedded default assets are written instead.
pub struct SiteBuilder {
    config: SiteConfig,
    output_dir: PathBuf,
    static_dir: Option<PathBuf>,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: SiteConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
            static_dir: None,
        }
    }

    /// Copy this directory instead of the embedded assets when it exists.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error.
    pub fn build(&self) -> Result<BuildStats, BuildError> {
        tracing::info!(source = %self.config.source_dir.display(), "Loading records");
        let collection = Arc::new(load_collection(&self.config.source_dir, &self.config)?);
        let collection_stats = collection.stats();

        create_dir(&self.output_dir)?;

        let cache: Box<dyn Cache> = if self.config.cache_enabled {
            Box::new(MemoryCache::new())
        } else {
            Box::new(NullCache)
        };
        let renderer = PageRenderer::new(Arc::clone(&collection), &self.config, cache.as_ref())?;

        let mut stats = BuildStats {
            adr_count: collection_stats.adr_count,
            diagram_count: collection_stats.diagram_count,
            ..BuildStats::default()
        };

        tracing::info!(output = %self.output_dir.display(), "Rendering pages");
        let mut pages = vec![PageKind::Index];
        pages.extend(
            collection
                .records()
                .iter()
                .map(|record| PageKind::Adr(record.number.clone())),
        );
        pages.push(PageKind::Search);
        for kind in &pages {
            renderer.render_to_file(kind, &self.output_dir)?;
            stats.page_count += 1;
        }

        match renderer.render_to_file(&PageKind::Docs, &self.output_dir) {
            Ok(_) => stats.page_count += 1,
            Err(RenderError::DocsMissing(path)) => {
                tracing::debug!(path = %path.display(), "No README, skipping docs page");
            }
            Err(e) => return Err(e.into()),
        }

        let index_path = self.output_dir.join(SEARCH_INDEX_FILE);
        let json = serde_json::to_vec_pretty(&renderer.search_index())?;
        fs::write(&index_path, json).map_err(|source| BuildError::Io {
            path: index_path,
            source,
        })?;

        stats.asset_count = self.write_assets()?;

        tracing::info!(
            adrs = stats.adr_count,
            pages = stats.page_count,
            assets = stats.asset_count,
            diagrams = stats.diagram_count,
            "Build complete"
        );
        Ok(stats)
    }

    fn write_assets(&self) -> Result<usize, BuildError> {
        let target = self.output_dir.join("static");
        let io_err = |source| BuildError::Io {
            path: target.clone(),
            source,
        };

        match &self.static_dir {
            Some(dir) if dir.is_dir() => {
                tracing::info!(dir = %dir.display(), "Copying static assets");
                copy_dir(dir, &target).map_err(io_err)
            }
            _ => {
                tracing::info!("Writing default assets");
                adr_assets::write_all(&target).map_err(io_err)
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively copy `src` into `dst`, returning the number of files copied.
fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
