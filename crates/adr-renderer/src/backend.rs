//! Render backend trait for output-specific markup.
//!
//! The generic [`MarkdownRenderer`](crate::MarkdownRenderer) handles document
//! structure (lists, tables, headings, footnote bookkeeping) and delegates the
//! concrete markup of leaf elements to a backend.

/// Backend trait for output-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "mermaid")
    /// * `content` - The raw code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>\n");
    }

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>\n");
    }

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a hard line break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>\n");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>\n");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }

    /// Render an inline footnote reference.
    ///
    /// `number` is the 1-based footnote number; `occurrence` counts earlier
    /// references to the same footnote so repeated references get unique ids.
    fn footnote_reference(number: usize, occurrence: usize, out: &mut String);

    /// Render the collected footnote definitions at the end of the document.
    ///
    /// Definitions arrive ordered by number, each as rendered HTML.
    fn footnote_section(definitions: &[(usize, String)], out: &mut String);
}
