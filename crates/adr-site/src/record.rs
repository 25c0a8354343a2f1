//! Record parsing.
//!
//! A record is one `NNNN-kebab-title.md` file. Its fields come from plain
//! markdown conventions:
//!
//! - **Title**: first `# ` line, default `Untitled ADR`
//! - **Status**: first non-blank line under `## Status`, default `Unknown`
//! - **Category**: a `Category: X` line or the first line under `## Category`,
//!   accepted only when allowed
//! - **Diagram type**: first matching keyword from a fixed, ordered table

use std::path::{Path, PathBuf};

use adr_renderer::{ConvertError, MarkdownPipeline, TocEntry};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::settings::SiteConfig;

/// Title used when a record has no `# ` heading.
pub const DEFAULT_TITLE: &str = "Untitled ADR";

/// Status used when a record has no `## Status` section.
pub const DEFAULT_STATUS: &str = "Unknown";

/// Lines scanned after a `## Category` heading.
const CATEGORY_SECTION_LINES: usize = 10;

/// Error parsing a single record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// File name does not follow `NNNN-title.md`.
    #[error("invalid record file name: {0}")]
    InvalidFileName(String),

    /// Markdown conversion failed.
    #[error("failed to convert {file}: {source}")]
    Convert {
        file: String,
        #[source]
        source: ConvertError,
    },
}

/// Diagram classification derived from diagram syntax keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Context,
    Container,
    Component,
    Sequence,
    State,
    Flowchart,
    /// A diagram fence without a more specific keyword.
    Generic,
    None,
}

/// Keywords in priority order. The first one found wins.
const DIAGRAM_KEYWORDS: &[(&str, DiagramKind)] = &[
    ("C4Context", DiagramKind::Context),
    ("C4Container", DiagramKind::Container),
    ("C4Component", DiagramKind::Component),
    ("sequenceDiagram", DiagramKind::Sequence),
    ("stateDiagram", DiagramKind::State),
    ("flowchart", DiagramKind::Flowchart),
];

impl DiagramKind {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Context => "Context",
            Self::Container => "Container",
            Self::Component => "Component",
            Self::Sequence => "Sequence",
            Self::State => "State",
            Self::Flowchart => "Flowchart",
            Self::Generic => "Diagram",
            Self::None => "none",
        }
    }
}

impl Serialize for DiagramKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One parsed decision record.
#[derive(Clone, Debug, Serialize)]
pub struct AdrRecord {
    /// Four-digit identifier taken from the file name.
    pub number: String,
    pub title: String,
    pub status: String,
    pub category: String,
    pub diagram_type: DiagramKind,
    /// Number of diagram fences in the source.
    pub diagram_count: usize,
    /// Converted body.
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub file_name: String,
    pub file_path: PathBuf,
    /// Filesystem modification time, informational only.
    pub modified_at: Option<DateTime<Utc>>,
    /// Hex SHA-256 of the raw file bytes.
    pub fingerprint: String,
    /// Raw markdown source.
    #[serde(skip)]
    pub content: String,
}

impl AdrRecord {
    /// Name of the generated page, e.g. `adr-0001.html`.
    #[must_use]
    pub fn page_name(&self) -> String {
        page_name(&self.number)
    }
}

/// Name of the generated page for a record number.
#[must_use]
pub fn page_name(number: &str) -> String {
    format!("adr-{number}.html")
}

/// Parses record files into [`AdrRecord`]s.
pub struct RecordParser<'a> {
    config: &'a SiteConfig,
    pipeline: MarkdownPipeline,
}

impl<'a> RecordParser<'a> {
    #[must_use]
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            pipeline: MarkdownPipeline::new(config.pipeline_config()),
        }
    }

    /// Parse the raw bytes of one record file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidFileName`] if `path` does not name a record
    /// file and [`ParseError::Convert`] if the bytes cannot be converted.
    pub fn parse(
        &self,
        path: &Path,
        bytes: &[u8],
        modified_at: Option<DateTime<Utc>>,
    ) -> Result<AdrRecord, ParseError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_valid_file_name(&file_name) {
            return Err(ParseError::InvalidFileName(file_name));
        }

        let converted = self
            .pipeline
            .convert_bytes(bytes)
            .map_err(|source| ParseError::Convert {
                file: file_name.clone(),
                source,
            })?;
        // Conversion already rejected invalid UTF-8.
        let content = String::from_utf8_lossy(bytes).into_owned();

        Ok(AdrRecord {
            number: file_name[..4].to_owned(),
            title: extract_title(&content),
            status: extract_status(&content),
            category: extract_category(&content, self.config),
            diagram_type: detect_diagram_kind(&content, &self.config.diagram_languages),
            diagram_count: count_diagrams(&content, &self.config.diagram_languages),
            html: converted.html,
            toc: converted.toc,
            fingerprint: fingerprint(bytes),
            file_path: path.to_path_buf(),
            file_name,
            modified_at,
            content,
        })
    }
}

/// Whether `name` looks like `NNNN-<anything>.md`.
///
/// Only the four-digit prefix, the dash and the extension are required here;
/// the stricter lowercase-title rule is a validation warning.
#[must_use]
pub fn is_valid_file_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 8
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && name.ends_with(".md")
}

/// Text of the first `# ` heading.
#[must_use]
pub fn extract_title(content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_owned()
}

/// First non-blank line after `## Status`, stopping at the next heading.
#[must_use]
pub fn extract_status(content: &str) -> String {
    let mut lines = content.lines().map(str::trim);
    if lines.by_ref().any(|line| line == "## Status") {
        for line in lines {
            if line.starts_with('#') {
                break;
            }
            if !line.is_empty() {
                return line.to_owned();
            }
        }
    }
    DEFAULT_STATUS.to_owned()
}

/// Category from a `Category:` line or a `## Category` section.
///
/// Values outside the allow-list are ignored; the configured default is
/// returned when nothing valid is found.
#[must_use]
pub fn extract_category(content: &str, config: &SiteConfig) -> String {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    for (i, line) in lines.iter().enumerate() {
        if line
            .get(..9)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("category:"))
        {
            let value = line[9..].trim();
            if config.is_valid_category(value) {
                return value.to_owned();
            }
        }

        if *line == "## Category" {
            let section = lines.iter().skip(i + 1).take(CATEGORY_SECTION_LINES);
            for candidate in section {
                if candidate.starts_with("##") {
                    break;
                }
                if !candidate.is_empty() && config.is_valid_category(candidate) {
                    return (*candidate).to_owned();
                }
            }
        }
    }

    config.default_category().to_owned()
}

/// Classify the diagrams in `content`.
#[must_use]
pub fn detect_diagram_kind<S: AsRef<str>>(content: &str, languages: &[S]) -> DiagramKind {
    if let Some((_, kind)) = DIAGRAM_KEYWORDS
        .iter()
        .find(|(keyword, _)| content.contains(keyword))
    {
        return *kind;
    }
    if count_diagrams(content, languages) > 0 {
        DiagramKind::Generic
    } else {
        DiagramKind::None
    }
}

/// Number of fenced blocks tagged with one of `languages`.
#[must_use]
pub fn count_diagrams<S: AsRef<str>>(content: &str, languages: &[S]) -> usize {
    languages
        .iter()
        .map(AsRef::as_ref)
        .filter(|lang| !lang.is_empty())
        .map(|lang| content.matches(&format!("```{lang}")).count())
        .sum()
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
