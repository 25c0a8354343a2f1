//! HTML backend for markdown rendering.
//!
//! Produces XHTML-compatible HTML: void elements are self-closed so the
//! output can be embedded verbatim in any page template.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML render backend.
///
/// - `<pre><code class="language-X">` for fenced code blocks
/// - `<br />`, `<hr />` and `<img ... />` void elements
/// - numbered footnote references with an end-notes list and back-links
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            writeln!(
                out,
                "<pre><code class=\"language-{}\">{}</code></pre>",
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            writeln!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        }
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}" alt="{}"{title_attr} />"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn hard_break(out: &mut String) {
        out.push_str("<br />\n");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr />\n");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input checked="" disabled="" type="checkbox" /> "#);
        } else {
            out.push_str(r#"<input disabled="" type="checkbox" /> "#);
        }
    }

    fn footnote_reference(number: usize, occurrence: usize, out: &mut String) {
        let id = if occurrence == 0 {
            format!("fnref:{number}")
        } else {
            format!("fnref{}:{number}", occurrence + 1)
        };
        write!(
            out,
            r##"<sup id="{id}"><a href="#fn:{number}" class="footnote-ref" role="doc-noteref">{number}</a></sup>"##
        )
        .unwrap();
    }

    fn footnote_section(definitions: &[(usize, String)], out: &mut String) {
        if definitions.is_empty() {
            return;
        }
        out.push_str("<div class=\"footnotes\" role=\"doc-endnotes\">\n<hr />\n<ol>\n");
        for (number, body) in definitions {
            let backref = format!(
                r##"&#160;<a href="#fnref:{number}" class="footnote-backref" role="doc-backlink">&#x21a9;&#xfe0e;</a>"##
            );
            let body = body.trim_end();
            let body = match body.strip_suffix("</p>") {
                Some(inner) => format!("{inner}{backref}</p>"),
                None => format!("{body}{backref}"),
            };
            writeln!(out, "<li id=\"fn:{number}\">\n{body}\n</li>").unwrap();
        }
        out.push_str("</ol>\n</div>\n");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), "fn main() {}", &mut out);
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_escapes_content() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("mermaid"), "A-->B & \"C\"", &mut out);
        assert_eq!(
            out,
            "<pre><code class=\"language-mermaid\">A--&gt;B &amp; &quot;C&quot;</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "plain code", &mut out);
        assert_eq!(out, "<pre><code>plain code</code></pre>\n");
    }

    #[test]
    fn test_image_is_self_closed() {
        let mut out = String::new();
        HtmlBackend::image("c4.png", "Context diagram", "", &mut out);
        assert_eq!(out, r#"<img src="c4.png" alt="Context diagram" />"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("c4.png", "Alt", "System \"context\"", &mut out);
        assert_eq!(
            out,
            r#"<img src="c4.png" alt="Alt" title="System &quot;context&quot;" />"#
        );
    }

    #[test]
    fn test_task_list_markers() {
        let mut out = String::new();
        HtmlBackend::task_list_marker(true, &mut out);
        HtmlBackend::task_list_marker(false, &mut out);
        assert_eq!(
            out,
            r#"<input checked="" disabled="" type="checkbox" /> <input disabled="" type="checkbox" /> "#
        );
    }

    #[test]
    fn test_footnote_reference_ids() {
        let mut out = String::new();
        HtmlBackend::footnote_reference(1, 0, &mut out);
        assert!(out.starts_with(r#"<sup id="fnref:1">"#));
        assert!(out.contains(r##"href="#fn:1""##));

        let mut out = String::new();
        HtmlBackend::footnote_reference(1, 1, &mut out);
        assert!(out.starts_with(r#"<sup id="fnref2:1">"#));
    }

    #[test]
    fn test_footnote_section_backref_inside_paragraph() {
        let mut out = String::new();
        HtmlBackend::footnote_section(&[(1, "<p>See RFC 7231.</p>\n".to_owned())], &mut out);
        assert!(out.starts_with("<div class=\"footnotes\" role=\"doc-endnotes\">\n<hr />\n<ol>\n"));
        assert!(out.contains(
            r##"<li id="fn:1">
<p>See RFC 7231.&#160;<a href="#fnref:1" class="footnote-backref" role="doc-backlink">&#x21a9;&#xfe0e;</a></p>
</li>"##
        ));
    }

    #[test]
    fn test_footnote_section_empty() {
        let mut out = String::new();
        HtmlBackend::footnote_section(&[], &mut out);
        assert!(out.is_empty());
    }
}
