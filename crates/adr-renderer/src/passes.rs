//! Ordered post-processing passes over rendered HTML.
//!
//! Each pass is a named, self-contained string transform. The pipeline runs
//! them in registration order: bare URLs are linked first, then record links
//! are rewritten, then diagram blocks are wrapped, so diagram containers never
//! see `.md` links.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A named transform over rendered HTML.
pub trait HtmlPass: Send + Sync {
    /// Short identifier used in logs and tests.
    fn name(&self) -> &'static str;

    /// Transform the HTML of one document.
    fn apply(&self, html: &str) -> String;
}

static RECORD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="(?:\./)?([0-9]{4})-[a-z0-9-]+\.md(#[^"]*)?""#).unwrap()
});

/// Rewrites links to sibling record sources (`NNNN-title.md`) into links to
/// their generated pages (`adr-NNNN.html`).
///
/// The optional `./` prefix is accepted and a `#fragment` is preserved. Other
/// links are left untouched.
pub struct LinkRewritePass {
    prefix: String,
}

impl LinkRewritePass {
    /// Create the pass for a base URL. An empty base URL yields root-relative links.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            prefix: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl HtmlPass for LinkRewritePass {
    fn name(&self) -> &'static str {
        "link-rewrite"
    }

    fn apply(&self, html: &str) -> String {
        RECORD_LINK
            .replace_all(html, |caps: &Captures<'_>| {
                let fragment = caps.get(2).map_or("", |m| m.as_str());
                format!(r#"<a href="{}/adr-{}.html{fragment}""#, self.prefix, &caps[1])
            })
            .into_owned()
    }
}

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:https?://|www\.)[^\s<]+").unwrap());

/// Escaped characters that end a bare URL.
const URL_TERMINATORS: [&str; 4] = ["&quot;", "&#x27;", "&lt;", "&gt;"];

/// Links bare `http://`, `https://` and `www.` URLs in text.
///
/// Text inside `<a>`, `<code>` and `<pre>` is left alone. Trailing
/// punctuation and unbalanced closing parentheses stay outside the link;
/// `www.` links get an `http://` scheme.
pub struct AutolinkPass;

impl HtmlPass for AutolinkPass {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn apply(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut protected = 0usize;
        let mut last = 0;

        for caps in TAG.captures_iter(html) {
            let Some(tag) = caps.get(0) else { continue };
            let text = &html[last..tag.start()];
            if protected == 0 {
                out.push_str(&link_urls(text));
            } else {
                out.push_str(text);
            }
            out.push_str(tag.as_str());
            last = tag.end();

            if matches!(caps[2].to_ascii_lowercase().as_str(), "a" | "code" | "pre") {
                if caps[1].is_empty() {
                    protected += 1;
                } else {
                    protected = protected.saturating_sub(1);
                }
            }
        }

        let tail = &html[last..];
        if protected == 0 {
            out.push_str(&link_urls(tail));
        } else {
            out.push_str(tail);
        }
        out
    }
}

fn link_urls(text: &str) -> String {
    BARE_URL
        .replace_all(text, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let (url, rest) = split_url(matched);
            if url.ends_with("://") || url.len() <= "www.".len() {
                return matched.to_owned();
            }
            let scheme = if url.starts_with("www.") { "http://" } else { "" };
            format!(r#"<a href="{scheme}{url}">{url}</a>{rest}"#)
        })
        .into_owned()
}

/// Split a URL candidate into the link and the trailing text it must not include.
fn split_url(candidate: &str) -> (&str, &str) {
    let mut end = URL_TERMINATORS
        .iter()
        .filter_map(|entity| candidate.find(entity))
        .min()
        .unwrap_or(candidate.len());

    loop {
        let url = &candidate[..end];
        if url.ends_with(['.', ',', ':', ';', '!', '?', '*', '_', '~']) {
            end -= 1;
        } else if url.ends_with(')') && url.matches('(').count() < url.matches(')').count() {
            end -= 1;
        } else {
            break;
        }
    }
    candidate.split_at(end)
}

/// Replaces fenced diagram code blocks with an interactive container.
///
/// Diagrams are numbered from 1 within each document; the number wires the
/// toolbar buttons to their container. The code block content is already
/// HTML-escaped by the renderer, so it is reused as-is for the
/// `data-diagram` attribute.
pub struct DiagramWrapPass {
    pattern: Option<Regex>,
}

impl DiagramWrapPass {
    /// Create the pass for the given fence languages (e.g. `["mermaid"]`).
    ///
    /// Language names are matched literally. An empty list disables the pass.
    #[must_use]
    pub fn new<S: AsRef<str>>(languages: &[S]) -> Self {
        let alternatives: Vec<String> = languages
            .iter()
            .map(|lang| regex::escape(lang.as_ref()))
            .filter(|lang| !lang.is_empty())
            .collect();
        let pattern = (!alternatives.is_empty()).then(|| {
            let source = format!(
                r#"(?s)<pre><code class="language-({})">(.*?)</code></pre>"#,
                alternatives.join("|")
            );
            // Alternatives are escaped literals, so the pattern always compiles.
            Regex::new(&source).unwrap()
        });
        Self { pattern }
    }
}

impl HtmlPass for DiagramWrapPass {
    fn name(&self) -> &'static str {
        "diagram-wrap"
    }

    fn apply(&self, html: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return html.to_owned();
        };
        let mut count = 0usize;
        pattern
            .replace_all(html, |caps: &Captures<'_>| {
                count += 1;
                wrap_diagram(count, &caps[1], &caps[2])
            })
            .into_owned()
    }
}

fn wrap_diagram(index: usize, lang: &str, code: &str) -> String {
    let id = format!("diagram-{index}");
    let mut out = String::with_capacity(code.len() * 2 + 512);
    writeln!(out, r#"<div class="diagram-container diagram-{lang}" id="{id}">"#).unwrap();
    out.push_str("<div class=\"diagram-toolbar\">\n");
    writeln!(
        out,
        r#"<button class="diagram-fullscreen" onclick="openDiagramFullscreen('{id}')" title="View fullscreen">&#x26f6;</button>"#
    )
    .unwrap();
    writeln!(
        out,
        r#"<button class="diagram-copy" onclick="copyDiagramSource('{id}')" title="Copy diagram source">&#x1f4cb;</button>"#
    )
    .unwrap();
    out.push_str("</div>\n");
    writeln!(
        out,
        r#"<div class="diagram-body" data-diagram="{code}" onclick="openDiagramFullscreen('{id}')" title="Click to view fullscreen">"#
    )
    .unwrap();
    writeln!(out, r#"<div class="{lang}">{code}</div>"#).unwrap();
    out.push_str("</div>\n</div>");
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_link_rewrite_without_base_url() {
        let pass = LinkRewritePass::new("");
        assert_eq!(
            pass.apply(r#"<a href="0001-use-postgres.md">Use Postgres</a>"#),
            r#"<a href="/adr-0001.html">Use Postgres</a>"#
        );
    }

    #[test]
    fn test_link_rewrite_with_base_url() {
        let pass = LinkRewritePass::new("https://x.io");
        assert_eq!(
            pass.apply(r#"<a href="0001-use-postgres.md">x</a>"#),
            r#"<a href="https://x.io/adr-0001.html">x</a>"#
        );
        let pass = LinkRewritePass::new("https://x.io/adrs/");
        assert_eq!(
            pass.apply(r#"<a href="0012-cache.md">x</a>"#),
            r#"<a href="https://x.io/adrs/adr-0012.html">x</a>"#
        );
    }

    #[test]
    fn test_link_rewrite_dot_prefix_fragment_and_title() {
        let pass = LinkRewritePass::new("");
        assert_eq!(
            pass.apply(r#"<a href="./0003-event-bus.md#consequences" title="Bus">x</a>"#),
            r##"<a href="/adr-0003.html#consequences" title="Bus">x</a>"##
        );
    }

    #[test]
    fn test_link_rewrite_leaves_other_links() {
        let pass = LinkRewritePass::new("");
        let html = concat!(
            r#"<a href="https://example.com/0001-x.md">a</a>"#,
            r#"<a href="README.md">b</a>"#,
            r#"<a href="01-short.md">c</a>"#,
            r#"<a href="0001-Upper.md">d</a>"#,
        );
        assert_eq!(pass.apply(html), html);
    }

    #[test]
    fn test_diagram_wrap_numbers_from_one() {
        let pass = DiagramWrapPass::new(&["mermaid"]);
        let html = concat!(
            "<p>a</p>\n",
            "<pre><code class=\"language-mermaid\">flowchart LR\n  A --&gt; B\n</code></pre>\n",
            "<pre><code class=\"language-mermaid\">sequenceDiagram\n</code></pre>\n",
        );
        let out = pass.apply(html);
        assert!(out.contains(r#"<div class="diagram-container diagram-mermaid" id="diagram-1">"#));
        assert!(out.contains(r#"<div class="diagram-container diagram-mermaid" id="diagram-2">"#));
        assert!(!out.contains("diagram-3"));
        assert!(out.contains("openDiagramFullscreen('diagram-1')"));
        assert!(out.contains("copyDiagramSource('diagram-2')"));
        assert!(out.contains(r#"data-diagram="flowchart LR"#));
        assert!(out.contains("<div class=\"mermaid\">flowchart LR\n  A --&gt; B\n</div>"));
        assert!(!out.contains("<pre>"));
    }

    #[test]
    fn test_diagram_wrap_ignores_other_languages() {
        let pass = DiagramWrapPass::new(&["mermaid"]);
        let html = "<pre><code class=\"language-rust\">fn main() {}</code></pre>\n";
        assert_eq!(pass.apply(html), html);
    }

    #[test]
    fn test_diagram_wrap_multiple_languages() {
        let pass = DiagramWrapPass::new(&["mermaid", "plantuml"]);
        let html = "<pre><code class=\"language-plantuml\">@startuml</code></pre>";
        let out = pass.apply(html);
        assert!(out.contains(r#"class="diagram-container diagram-plantuml" id="diagram-1""#));
        assert!(out.contains(r#"<div class="plantuml">@startuml</div>"#));
    }

    #[test]
    fn test_diagram_wrap_disabled() {
        let pass = DiagramWrapPass::new::<&str>(&[]);
        let html = "<pre><code class=\"language-mermaid\">x</code></pre>";
        assert_eq!(pass.apply(html), html);
    }

    #[test]
    fn test_autolink_bare_urls() {
        assert_eq!(
            AutolinkPass.apply("<p>See https://example.com for details.</p>"),
            r#"<p>See <a href="https://example.com">https://example.com</a> for details.</p>"#
        );
        assert_eq!(
            AutolinkPass.apply("<li>www.example.com/docs</li>"),
            r#"<li><a href="http://www.example.com/docs">www.example.com/docs</a></li>"#
        );
    }

    #[test]
    fn test_autolink_trims_trailing_punctuation() {
        assert_eq!(
            AutolinkPass.apply("(see https://x.io/a?b=1&amp;c=2)."),
            r#"(see <a href="https://x.io/a?b=1&amp;c=2">https://x.io/a?b=1&amp;c=2</a>)."#
        );
        assert_eq!(
            AutolinkPass.apply("https://en.wikipedia.org/wiki/Rust_(language)"),
            r#"<a href="https://en.wikipedia.org/wiki/Rust_(language)">https://en.wikipedia.org/wiki/Rust_(language)</a>"#
        );
        assert_eq!(
            AutolinkPass.apply("&quot;https://x.io&quot;"),
            r#"&quot;<a href="https://x.io">https://x.io</a>&quot;"#
        );
    }

    #[test]
    fn test_autolink_skips_links_and_code() {
        let html = concat!(
            r#"<p><a href="https://x.io">https://x.io</a></p>"#,
            "<p><code>curl https://x.io</code></p>",
            "<pre><code class=\"language-mermaid\">click A https://x.io\n</code></pre>",
        );
        assert_eq!(AutolinkPass.apply(html), html);
    }

    #[test]
    fn test_autolink_ignores_bare_prefixes() {
        let html = "<p>https:// and www. alone</p>";
        assert_eq!(AutolinkPass.apply(html), html);
    }

    #[test]
    fn test_pass_names() {
        assert_eq!(AutolinkPass.name(), "autolink");
        assert_eq!(LinkRewritePass::new("").name(), "link-rewrite");
        assert_eq!(DiagramWrapPass::new(&["mermaid"]).name(), "diagram-wrap");
    }
}
