//! Context tracked while walking markdown events.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment attribute for the current cell.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
    /// Pending (src, title) waiting for the alt text to complete.
    pending: Option<(String, String)>,
}

impl ImageState {
    pub fn start(&mut self, src: String, title: String) {
        self.active = true;
        self.alt_text.clear();
        self.pending = Some((src, title));
    }

    /// End image capture and return (src, title, alt).
    pub fn end(&mut self) -> Option<(String, String, String)> {
        self.active = false;
        let alt = std::mem::take(&mut self.alt_text);
        self.pending.take().map(|(src, title)| (src, title, alt))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking headings and building the table of contents.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Level and explicit `{#id}` of the heading being processed.
    current: Option<(u8, Option<String>)>,
    /// Plain text of the current heading (for slug and table of contents).
    text: String,
    /// HTML of the current heading (with inline formatting).
    html: String,
    toc: Vec<TocEntry>,
    /// Next suffix to try per slug.
    id_counts: HashMap<String, usize>,
    /// Every id handed out so far, explicit ones included.
    used_ids: HashSet<String>,
}

impl HeadingState {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn start_heading(&mut self, level: u8, explicit_id: Option<String>) {
        self.current = Some((level, explicit_id));
        self.text.clear();
        self.html.clear();
    }

    /// Complete heading and record a table of contents entry.
    ///
    /// Returns (level, id, html) or `None` if not in a heading.
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let (level, explicit_id) = self.current.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);

        let id = match explicit_id {
            Some(id) => id,
            None => self.generate_id(&text),
        };
        self.used_ids.insert(id.clone());

        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some((level, id, html))
    }

    /// Generate an ID not used by any earlier heading.
    ///
    /// Repeated slugs get `-1`, `-2`, ... suffixes, skipping any suffixed
    /// form that an earlier heading already owns.
    fn generate_id(&mut self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id = "heading".to_owned();
        }
        let next = self.id_counts.entry(base_id.clone()).or_default();
        loop {
            let candidate = match *next {
                0 => base_id.clone(),
                n => format!("{base_id}-{n}"),
            };
            *next += 1;
            if !self.used_ids.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// State for numbering footnotes and collecting their definitions.
///
/// Footnotes are numbered in order of first appearance, whether that is a
/// reference or the definition itself.
#[derive(Default)]
pub(crate) struct FootnoteState {
    numbers: HashMap<String, usize>,
    references: HashMap<usize, usize>,
    definitions: Vec<(usize, String)>,
    /// Document output stashed while a definition body is being rendered.
    stash: Option<String>,
}

impl FootnoteState {
    fn number_for(&mut self, label: &str) -> usize {
        let next = self.numbers.len() + 1;
        *self.numbers.entry(label.to_owned()).or_insert(next)
    }

    /// Register a reference and return (number, occurrence).
    pub fn reference(&mut self, label: &str) -> (usize, usize) {
        let number = self.number_for(label);
        let seen = self.references.entry(number).or_default();
        let occurrence = *seen;
        *seen += 1;
        (number, occurrence)
    }

    /// Begin a definition, taking ownership of the document output so far.
    pub fn start_definition(&mut self, label: &str, document: String) -> usize {
        self.stash = Some(document);
        self.number_for(label)
    }

    /// Finish a definition and return the stashed document output.
    pub fn end_definition(&mut self, number: usize, body: String) -> String {
        self.definitions.push((number, body));
        self.stash.take().unwrap_or_default()
    }

    /// Take all definitions ordered by footnote number.
    pub fn take_definitions(&mut self) -> Vec<(usize, String)> {
        let mut definitions = std::mem::take(&mut self.definitions);
        definitions.sort_by_key(|(number, _)| *number);
        definitions
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
