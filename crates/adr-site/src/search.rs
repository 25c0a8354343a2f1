//! Client-side search index.

use serde::{Deserialize, Serialize};

use crate::record::AdrRecord;

/// Maximum excerpt length in characters, including the ellipsis.
pub const EXCERPT_LEN: usize = 500;

/// Search index served as `search-index.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    /// Number of items.
    pub generated: usize,
    pub items: Vec<SearchItem>,
}

/// One searchable record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub number: String,
    pub title: String,
    pub status: String,
    /// Source text with markdown markers removed, at most [`EXCERPT_LEN`] characters.
    pub content: String,
    #[serde(rename = "diagramType")]
    pub diagram_type: String,
    /// Page name relative to the site root.
    pub url: String,
}

/// Build the search index for `records`, preserving their order.
#[must_use]
pub fn build_search_index(records: &[AdrRecord]) -> SearchIndex {
    let items: Vec<SearchItem> = records
        .iter()
        .map(|record| SearchItem {
            number: record.number.clone(),
            title: record.title.clone(),
            status: record.status.clone(),
            content: excerpt(&record.content),
            diagram_type: record.diagram_type.label().to_owned(),
            url: record.page_name(),
        })
        .collect();

    SearchIndex {
        generated: items.len(),
        items,
    }
}

/// Strip `#`, `*` and `_`, then cut to [`EXCERPT_LEN`] characters.
fn excerpt(content: &str) -> String {
    let stripped: String = content
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_'))
        .collect();
    if stripped.chars().count() <= EXCERPT_LEN {
        return stripped;
    }
    let mut cut: String = stripped.chars().take(EXCERPT_LEN - 3).collect();
    cut.push_str("...");
    cut
}
