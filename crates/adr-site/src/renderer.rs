//! Page rendering with a content-addressed cache.
//!
//! [`PageRenderer`] turns a [`PageKind`] into HTML. Every render computes the
//! cache key first and only executes a template on a miss:
//!
//! | Page     | Key                                  |
//! |----------|--------------------------------------|
//! | index    | `index-<collection fingerprint>`     |
//! | search   | `search-<collection fingerprint>`    |
//! | record   | `adr-<number>-<record fingerprint>`  |
//! | docs     | `docs-<sha256 of the README>`        |
//!
//! The collection fingerprint covers every record, so any change invalidates
//! the index and search pages while other record pages stay cached.
//!
//! Output goes either to a file ([`render_to_file`](PageRenderer::render_to_file))
//! or to any writer ([`render_to`](PageRenderer::render_to)), such as an HTTP
//! response body.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use adr_cache::{Cache, CacheBucket, CacheBucketExt};
use adr_renderer::MarkdownPipeline;
use minijinja::{Value, context};
use serde::Serialize;

use crate::loader::Collection;
use crate::record::{AdrRecord, fingerprint, page_name};
use crate::search::{SearchIndex, build_search_index};
use crate::settings::SiteConfig;
use crate::templates::TemplateEngine;

/// Error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No record with this number.
    #[error("ADR not found: {0}")]
    NotFound(String),

    /// The documentation page has no README to render.
    #[error("documentation file not found: {}", .0.display())]
    DocsMissing(PathBuf),

    /// Template compilation or execution failed.
    #[error("template {template} failed: {source}")]
    Template {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// File could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing to the output sink failed.
    #[error("failed to write page: {0}")]
    Write(#[source] io::Error),
}

/// A page that can be rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Index,
    /// Single record page, by number.
    Adr(String),
    Search,
    /// README rendered as documentation.
    Docs,
}

impl PageKind {
    /// Template used for this page.
    #[must_use]
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Adr(_) => "adr.html",
            Self::Search => "search.html",
            Self::Docs => "docs.html",
        }
    }

    /// File name of the generated page.
    #[must_use]
    pub fn output_file(&self) -> String {
        match self {
            Self::Adr(number) => page_name(number),
            other => other.template_name().to_owned(),
        }
    }

    /// Breadcrumb type passed to templates.
    #[must_use]
    pub fn breadcrumb(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Adr(_) => "adr",
            Self::Search => "search",
            Self::Docs => "docs",
        }
    }
}

/// Result of [`PageRenderer::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub cache_key: String,
    /// Whether the page came from the cache without template execution.
    pub from_cache: bool,
}

/// Result of [`PageRenderer::render_to`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutcome {
    pub cache_key: String,
    pub from_cache: bool,
    pub bytes_written: usize,
}

#[derive(Serialize)]
struct IndexStats {
    total: usize,
    accepted: usize,
    proposed: usize,
    deprecated: usize,
    superseded: usize,
    diagrams: usize,
}

/// What a page is rendered from.
enum PageSource {
    Collection,
    Record(usize),
    Readme(String),
}

struct PageKey {
    key: String,
    etag: String,
    source: PageSource,
}

/// Renders pages for one loaded collection.
///
/// Safe to share between threads; the collection is read-only and the
/// cache buckets synchronise internally.
pub struct PageRenderer {
    collection: Arc<Collection>,
    templates: TemplateEngine,
    pipeline: MarkdownPipeline,
    page_bucket: Box<dyn CacheBucket>,
    search_bucket: Box<dyn CacheBucket>,
    base_url: String,
    readme_path: PathBuf,
    statuses: Vec<String>,
}

impl PageRenderer {
    /// Create a renderer.
    ///
    /// Pass [`adr_cache::NullCache`] to disable caching.
    ///
    /// # Errors
    ///
    /// Returns an error if the templates cannot be loaded.
    pub fn new(
        collection: Arc<Collection>,
        config: &SiteConfig,
        cache: &dyn Cache,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            collection,
            templates: TemplateEngine::new(config)?,
            pipeline: MarkdownPipeline::new(config.pipeline_config()),
            page_bucket: cache.bucket("pages"),
            search_bucket: cache.bucket("search"),
            base_url: config.base_url().trim_end_matches('/').to_owned(),
            readme_path: config.readme_path.clone(),
            statuses: config.allowed_statuses.clone(),
        })
    }

    #[must_use]
    pub fn collection(&self) -> &Arc<Collection> {
        &self.collection
    }

    /// Number of template executions so far.
    #[must_use]
    pub fn template_executions(&self) -> usize {
        self.templates.executions()
    }

    /// Compute the cache key for a page without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotFound`] for an unknown record and
    /// [`RenderError::DocsMissing`] when the README does not exist.
    pub fn cache_key(&self, kind: &PageKind) -> Result<String, RenderError> {
        Ok(self.page_key(kind)?.key)
    }

    /// Render a page, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotFound`] for an unknown record,
    /// [`RenderError::DocsMissing`] when the README does not exist and
    /// [`RenderError::Template`] when template execution fails.
    pub fn render(&self, kind: &PageKind) -> Result<RenderedPage, RenderError> {
        let PageKey { key, etag, source } = self.page_key(kind)?;
        self.render_cached(kind, key, &etag, || match source {
            PageSource::Record(index) => self.adr_context(index),
            PageSource::Readme(readme) => self.docs_context(&readme),
            PageSource::Collection if *kind == PageKind::Search => self.search_context(),
            PageSource::Collection => self.index_context(),
        })
    }

    /// Render a page into `writer`.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render), plus [`RenderError::Write`] if the
    /// writer fails.
    pub fn render_to<W: Write>(
        &self,
        kind: &PageKind,
        writer: &mut W,
    ) -> Result<RenderOutcome, RenderError> {
        let page = self.render(kind)?;
        writer
            .write_all(page.html.as_bytes())
            .map_err(RenderError::Write)?;
        Ok(RenderOutcome {
            bytes_written: page.html.len(),
            cache_key: page.cache_key,
            from_cache: page.from_cache,
        })
    }

    /// Render a page into `dir`, named by [`PageKind::output_file`].
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render), plus [`RenderError::Io`] if the file
    /// cannot be written.
    pub fn render_to_file(&self, kind: &PageKind, dir: &Path) -> Result<PathBuf, RenderError> {
        let page = self.render(kind)?;
        let path = dir.join(kind.output_file());
        std::fs::write(&path, page.html.as_bytes())
            .map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Search index for the collection, cached by collection fingerprint.
    #[must_use]
    pub fn search_index(&self) -> SearchIndex {
        let fp = self.collection.fingerprint();
        let key = format!("search-index-{fp}");
        if let Some(index) = self.search_bucket.get_json::<SearchIndex>(&key, fp) {
            return index;
        }
        let index = build_search_index(self.collection.records());
        self.search_bucket.set_json(&key, fp, &index);
        index
    }

    fn render_cached(
        &self,
        kind: &PageKind,
        key: String,
        etag: &str,
        context: impl FnOnce() -> Value,
    ) -> Result<RenderedPage, RenderError> {
        if let Some(html) = self.page_bucket.get_string(&key, etag) {
            tracing::debug!(key = %key, "Page cache hit");
            return Ok(RenderedPage {
                html,
                cache_key: key,
                from_cache: true,
            });
        }

        tracing::debug!(key = %key, template = kind.template_name(), "Rendering page");
        let html = self.templates.render(kind.template_name(), context())?;
        self.page_bucket.set_string(&key, etag, &html);

        Ok(RenderedPage {
            html,
            cache_key: key,
            from_cache: false,
        })
    }

    /// Cache key, etag and template input for a page.
    fn page_key(&self, kind: &PageKind) -> Result<PageKey, RenderError> {
        let collection_fp = self.collection.fingerprint();
        Ok(match kind {
            PageKind::Index | PageKind::Search => PageKey {
                key: format!("{}-{collection_fp}", kind.breadcrumb()),
                etag: collection_fp.to_owned(),
                source: PageSource::Collection,
            },
            PageKind::Adr(number) => {
                let (index, record) = self.find(number)?;
                PageKey {
                    key: format!("adr-{}-{}", record.number, record.fingerprint),
                    etag: record.fingerprint.clone(),
                    source: PageSource::Record(index),
                }
            }
            PageKind::Docs => {
                let readme = self.read_readme()?;
                let readme_fp = fingerprint(readme.as_bytes());
                PageKey {
                    key: format!("docs-{readme_fp}"),
                    etag: readme_fp,
                    source: PageSource::Readme(readme),
                }
            }
        })
    }

    fn find(&self, number: &str) -> Result<(usize, &AdrRecord), RenderError> {
        self.collection
            .find(number)
            .ok_or_else(|| RenderError::NotFound(number.to_owned()))
    }

    /// Base URL marked safe so templates do not escape its slashes.
    fn base_url(&self) -> Value {
        Value::from_safe_string(self.base_url.clone())
    }

    fn read_readme(&self) -> Result<String, RenderError> {
        std::fs::read_to_string(&self.readme_path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RenderError::DocsMissing(self.readme_path.clone())
            } else {
                RenderError::Io {
                    path: self.readme_path.clone(),
                    source,
                }
            }
        })
    }

    fn index_context(&self) -> Value {
        let collection = &self.collection;
        context! {
            title => "Architecture Decision Records",
            adrs => collection.records(),
            stats => IndexStats {
                total: collection.len(),
                accepted: collection.count_by_status("Accepted"),
                proposed: collection.count_by_status("Proposed"),
                deprecated: collection.count_by_status("Deprecated"),
                superseded: collection.count_by_status("Superseded"),
                diagrams: collection.stats().diagram_count,
            },
            base_url => self.base_url(),
            breadcrumb => PageKind::Index.breadcrumb(),
        }
    }

    fn adr_context(&self, index: usize) -> Value {
        let records = self.collection.records();
        let record = &records[index];
        let (previous, next) = self.collection.neighbours(index);
        context! {
            title => format!("ADR-{}: {}", record.number, record.title),
            adr => record,
            adrs => records,
            previous => previous,
            next => next,
            base_url => self.base_url(),
            breadcrumb => "adr",
        }
    }

    fn search_context(&self) -> Value {
        context! {
            title => "Search ADRs",
            adrs => self.collection.records(),
            statuses => &self.statuses,
            base_url => self.base_url(),
            breadcrumb => PageKind::Search.breadcrumb(),
        }
    }

    fn docs_context(&self, readme: &str) -> Value {
        context! {
            title => "Documentation",
            content => self.pipeline.convert(readme).html,
            adrs => self.collection.records(),
            base_url => self.base_url(),
            breadcrumb => PageKind::Docs.breadcrumb(),
        }
    }
}
