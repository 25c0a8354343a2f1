//! End-to-end markdown conversion.

use pulldown_cmark::{Options, Parser};

use crate::html::HtmlBackend;
use crate::normalize::normalize;
use crate::passes::{AutolinkPass, DiagramWrapPass, HtmlPass, LinkRewritePass};
use crate::renderer::MarkdownRenderer;
use crate::state::TocEntry;

/// Error converting a document.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Source bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Settings for [`MarkdownPipeline`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Prefix for rewritten record links. Empty yields root-relative links.
    pub base_url: String,
    /// Fence languages wrapped as interactive diagrams.
    pub diagram_languages: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            diagram_languages: vec!["mermaid".to_owned()],
        }
    }
}

/// Output of a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Converted {
    /// HTML body, safe to embed in a page template.
    pub html: String,
    /// Table of contents, one entry per heading.
    pub toc: Vec<TocEntry>,
}

/// Markdown to HTML converter for decision records.
///
/// Runs [`normalize`], renders with the extensions records use (tables,
/// strikethrough, task lists, footnotes, definition lists, heading ids), then
/// applies the HTML passes in order. The default passes are bare URL linking,
/// record link rewriting and diagram wrapping; [`with_pass`](Self::with_pass) appends more.
pub struct MarkdownPipeline {
    options: Options,
    passes: Vec<Box<dyn HtmlPass>>,
}

impl MarkdownPipeline {
    /// Create a pipeline with the default passes.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let passes: Vec<Box<dyn HtmlPass>> = vec![
            Box::new(AutolinkPass),
            Box::new(LinkRewritePass::new(&config.base_url)),
            Box::new(DiagramWrapPass::new(config.diagram_languages.as_slice())),
        ];
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_DEFINITION_LIST
                | Options::ENABLE_HEADING_ATTRIBUTES,
            passes,
        }
    }

    /// Append a pass that runs after the existing ones.
    #[must_use]
    pub fn with_pass<P: HtmlPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Names of the registered passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Convert markdown text to HTML.
    #[must_use]
    pub fn convert(&self, markdown: &str) -> Converted {
        let source = normalize(markdown);
        let parser = Parser::new_ext(&source, self.options);
        let result = MarkdownRenderer::<HtmlBackend>::new().render(parser);

        let html = self
            .passes
            .iter()
            .fold(result.html, |html, pass| pass.apply(&html));

        Converted {
            html,
            toc: result.toc,
        }
    }

    /// Convert raw document bytes to HTML.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidUtf8`] if the bytes are not UTF-8.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<Converted, ConvertError> {
        let markdown = std::str::from_utf8(bytes)?;
        Ok(self.convert(markdown))
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct UppercasePass;

    impl HtmlPass for UppercasePass {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn apply(&self, html: &str) -> String {
            html.to_uppercase()
        }
    }

    #[test]
    fn test_default_pass_order() {
        let pipeline = MarkdownPipeline::default();
        assert_eq!(
            pipeline.pass_names(),
            ["autolink", "link-rewrite", "diagram-wrap"]
        );
    }

    #[test]
    fn test_with_pass_appends() {
        let pipeline = MarkdownPipeline::default().with_pass(UppercasePass);
        assert_eq!(
            pipeline.pass_names(),
            ["autolink", "link-rewrite", "diagram-wrap", "uppercase"]
        );
        assert_eq!(pipeline.convert("hi").html, "<P>HI</P>\n");
    }

    #[test]
    fn test_convert_record() {
        let pipeline = MarkdownPipeline::default();
        let converted = pipeline.convert(
            "# Use Postgres\n## Status\nAccepted\n## Context\nSee [logging](0002-logging.md).\n",
        );
        assert!(converted.html.contains(r#"<h1 id="use-postgres">Use Postgres</h1>"#));
        assert!(converted.html.contains(r#"<h2 id="status">Status</h2>"#));
        assert!(converted.html.contains("<p>Accepted</p>"));
        assert!(converted.html.contains(r#"<a href="/adr-0002.html">logging</a>"#));
        let titles: Vec<_> = converted.toc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Use Postgres", "Status", "Context"]);
    }

    #[test]
    fn test_convert_with_base_url() {
        let pipeline = MarkdownPipeline::new(PipelineConfig {
            base_url: "https://x.io".to_owned(),
            ..PipelineConfig::default()
        });
        let converted = pipeline.convert("[text](0001-use-postgres.md)");
        assert_eq!(
            converted.html,
            "<p><a href=\"https://x.io/adr-0001.html\">text</a></p>\n"
        );
    }

    #[test]
    fn test_diagrams_numbered_per_document() {
        let pipeline = MarkdownPipeline::default();
        let markdown = "```mermaid\nflowchart LR\n  A --> B\n```\n\ntext\n\n```mermaid\nflowchart TD\n```\n";
        let first = pipeline.convert(markdown).html;
        assert!(first.contains(r#"id="diagram-1""#));
        assert!(first.contains(r#"id="diagram-2""#));

        // Numbering restarts for every document.
        let second = pipeline.convert("```mermaid\nflowchart LR\n```\n").html;
        assert!(second.contains(r#"id="diagram-1""#));
        assert!(!second.contains(r#"id="diagram-2""#));
    }

    #[test]
    fn test_link_inside_diagram_source_is_not_rewritten() {
        let pipeline = MarkdownPipeline::default();
        let html = pipeline
            .convert("```mermaid\nclick A \"0001-x.md\"\n```\n")
            .html;
        assert!(html.contains("0001-x.md"));
    }

    #[test]
    fn test_convert_links_bare_urls() {
        let pipeline = MarkdownPipeline::default();
        assert_eq!(
            pipeline.convert("See https://example.com for details.\n").html,
            "<p>See <a href=\"https://example.com\">https://example.com</a> for details.</p>\n"
        );
        let html = pipeline
            .convert("Run `curl https://x.io` or see <https://x.io>.\n")
            .html;
        assert_eq!(html.matches("<a href").count(), 1);
    }

    #[test]
    fn test_heading_ids_unique_against_suffixed_slugs() {
        let toc = MarkdownPipeline::default()
            .convert("# FAQ\n\n## FAQ\n\n## FAQ 1\n")
            .toc;
        let ids: Vec<_> = toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["faq", "faq-1", "faq-1-1"]);
    }

    #[test]
    fn test_convert_crlf_source() {
        let pipeline = MarkdownPipeline::default();
        let html = pipeline.convert("# Title\r\n## Status\r\nAccepted\r\n").html;
        assert!(html.contains("<p>Accepted</p>"));
        assert!(!html.contains('\r'));
    }

    #[test]
    fn test_convert_bytes_rejects_invalid_utf8() {
        let pipeline = MarkdownPipeline::default();
        let err = pipeline.convert_bytes(&[b'#', b' ', 0xff]).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidUtf8(_)));
        assert!(pipeline.convert_bytes(b"# ok").is_ok());
    }
}
