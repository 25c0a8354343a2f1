//! Record loading, page rendering and static site generation for ADRs.
//!
//! This crate provides:
//! - [`RecordParser`] and [`load_collection`]: parse `NNNN-title.md` files
//!   into a sorted, de-duplicated [`Collection`]
//! - [`PageRenderer`]: render index, record, search and docs pages through a
//!   fingerprint-keyed cache, into files or any writer
//! - [`SiteBuilder`]: write a complete static site
//! - [`Validator`] and [`AdrCreator`]: authoring helpers
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use adr_cache::MemoryCache;
//! use adr_site::{PageKind, PageRenderer, SiteConfig, load_collection};
//!
//! let config = SiteConfig::new("adr");
//! let collection = Arc::new(load_collection(&config.source_dir, &config)?);
//! let renderer = PageRenderer::new(collection, &config, &MemoryCache::new())?;
//!
//! let page = renderer.render(&PageKind::Adr("0001".to_owned()))?;
//! println!("{}", page.html);
//! # Ok(())
//! # }
//! ```

mod builder;
mod creator;
mod loader;
mod record;
mod renderer;
mod search;
mod settings;
mod templates;
mod validator;

pub use builder::{BuildError, BuildStats, SEARCH_INDEX_FILE, SiteBuilder};
pub use creator::{AdrCreator, CreateError, NewAdr, kebab_case, next_number};
pub use loader::{
    Collection, CollectionStats, LoadError, SkippedFile, TEMPLATE_FILE, load_collection,
};
pub use record::{
    AdrRecord, DEFAULT_STATUS, DEFAULT_TITLE, DiagramKind, ParseError, RecordParser,
    count_diagrams, detect_diagram_kind, extract_category, extract_status, extract_title,
    fingerprint, is_valid_file_name, page_name,
};
pub use renderer::{PageKind, PageRenderer, RenderError, RenderOutcome, RenderedPage};
pub use search::{EXCERPT_LEN, SearchIndex, SearchItem, build_search_index};
pub use settings::{SiteConfig, StatusStyle};
pub use templates::TemplateEngine;
pub use validator::{
    Issue, IssueLevel, MAX_LINE_LENGTH, REQUIRED_SECTIONS, ValidateError, ValidationReport,
    Validator,
};

// Re-export TocEntry from adr-renderer for convenience
pub use adr_renderer::TocEntry;
