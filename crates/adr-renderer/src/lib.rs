//! Markdown to HTML conversion for architecture decision records.
//!
//! The crate is organised as a pipeline:
//!
//! 1. [`normalize`]: line endings and blank lines around headings
//! 2. [`MarkdownRenderer`]: pulldown-cmark events to HTML via a [`RenderBackend`]
//! 3. [`HtmlPass`]es: ordered string transforms over the rendered HTML
//!    ([`AutolinkPass`], [`LinkRewritePass`], then [`DiagramWrapPass`])
//!
//! [`MarkdownPipeline`] wires the three stages together with the parser
//! options decision records rely on (tables, footnotes, task lists, ...).
//!
//! # Example
//!
//! ```
//! use adr_renderer::{MarkdownPipeline, PipelineConfig};
//!
//! let pipeline = MarkdownPipeline::new(PipelineConfig::default());
//! let converted = pipeline.convert("# Use Postgres\n\nSee [logging](0002-logging.md).");
//! assert!(converted.html.contains(r#"href="/adr-0002.html""#));
//! ```

mod backend;
mod html;
mod normalize;
mod passes;
mod pipeline;
mod renderer;
mod state;
mod util;

pub use backend::RenderBackend;
pub use html::HtmlBackend;
pub use normalize::normalize;
pub use passes::{AutolinkPass, DiagramWrapPass, HtmlPass, LinkRewritePass};
pub use pipeline::{ConvertError, Converted, MarkdownPipeline, PipelineConfig};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
