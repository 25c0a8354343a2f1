//! Advisory checks over a record directory.
//!
//! Unlike loading, validation never stops at the first problem: every finding
//! is collected as an [`Issue`] so authors can fix them in one pass.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::loader::TEMPLATE_FILE;
use crate::record::extract_status;
use crate::settings::SiteConfig;

static STRICT_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[a-z0-9-]+\.md$").unwrap());

/// Sections every record must contain.
pub const REQUIRED_SECTIONS: [&str; 4] = ["Status", "Context", "Decision", "Consequences"];

/// Longest line accepted in strict mode, in characters.
pub const MAX_LINE_LENGTH: usize = 120;

/// Error that prevents validation from running.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ValidateError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Severity of an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub file: String,
    /// 1-based line number, 0 when the issue concerns the whole file.
    pub line: usize,
    pub level: IssueLevel,
    pub message: String,
}

/// Outcome of a validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
    /// Record files checked.
    pub file_count: usize,
    pub diagram_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    fn push(&mut self, file: &str, line: usize, level: IssueLevel, message: impl Into<String>) {
        match level {
            IssueLevel::Error => self.error_count += 1,
            IssueLevel::Warning => self.warning_count += 1,
        }
        self.issues.push(Issue {
            file: file.to_owned(),
            line,
            level,
            message: message.into(),
        });
    }
}

/// Checks record files against the authoring conventions.
pub struct Validator<'a> {
    config: &'a SiteConfig,
    strict: bool,
}

impl<'a> Validator<'a> {
    /// Create a validator. Strict mode adds line length and trailing
    /// whitespace warnings.
    #[must_use]
    pub fn new(config: &'a SiteConfig, strict: bool) -> Self {
        Self { config, strict }
    }

    /// Validate every record in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError`] if the directory or a record cannot be read.
    pub fn validate_dir(&self, dir: &Path) -> Result<ValidationReport, ValidateError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ValidateError { path, source }
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err(dir))? {
            let entry = entry.map_err(io_err(dir))?;
            if entry.file_type().map_err(io_err(&entry.path()))?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".md") && name != TEMPLATE_FILE {
                names.push(name);
            }
        }
        names.sort();

        let mut report = ValidationReport::default();
        let mut files = Vec::new();
        for name in names {
            if STRICT_FILE_NAME.is_match(&name) {
                files.push(name);
            } else {
                report.push(
                    &name,
                    0,
                    IssueLevel::Error,
                    "Invalid ADR filename format. Expected: NNNN-kebab-case-title.md",
                );
            }
        }
        report.file_count = files.len();

        check_numbering(&files, &mut report);

        for name in &files {
            let path = dir.join(name);
            let content = fs::read_to_string(&path).map_err(io_err(&path))?;
            self.validate_content(name, &content, &mut report);
        }

        Ok(report)
    }

    /// Validate the content of one record, appending findings to `report`.
    pub fn validate_content(&self, file: &str, content: &str, report: &mut ValidationReport) {
        let lines: Vec<&str> = content.lines().collect();

        check_sections(file, &lines, report);
        check_headings(file, &lines, report);
        report.diagram_count += self.check_diagrams(file, &lines, report);
        self.check_status(file, content, report);

        if self.strict {
            check_style(file, &lines, report);
        }
    }

    fn check_diagrams(&self, file: &str, lines: &[&str], report: &mut ValidationReport) -> usize {
        let mut count = 0;
        let mut open: Option<usize> = None;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if open.is_none() {
                let is_diagram = trimmed.strip_prefix("```").is_some_and(|lang| {
                    self.config.diagram_languages.iter().any(|l| l == lang)
                });
                if is_diagram {
                    open = Some(i + 1);
                    count += 1;
                }
            } else if trimmed == "```" {
                open = None;
            }
        }

        if let Some(line) = open {
            report.push(file, line, IssueLevel::Error, "Unclosed diagram block");
        }
        count
    }

    fn check_status(&self, file: &str, content: &str, report: &mut ValidationReport) {
        let status = extract_status(content);
        if !self.config.is_valid_status(&status) {
            report.push(
                file,
                0,
                IssueLevel::Warning,
                format!(
                    "Unknown status '{status}'. Expected one of: {}",
                    self.config.allowed_statuses.join(", ")
                ),
            );
        }
    }
}

fn check_numbering(files: &[String], report: &mut ValidationReport) {
    let numbers: Vec<u32> = files
        .iter()
        .filter_map(|name| name.get(..4).and_then(|n| n.parse().ok()))
        .collect();

    for pair in numbers.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current != previous + 1 {
            report.push(
                &format!("ADR-{current:04}"),
                0,
                IssueLevel::Error,
                format!("Gap in ADR numbering: {current:04} follows {previous:04}"),
            );
        }
    }
}

fn check_sections(file: &str, lines: &[&str], report: &mut ValidationReport) {
    let headings: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.trim().strip_prefix("## "))
        .map(str::trim)
        .collect();

    for section in REQUIRED_SECTIONS {
        if !headings.iter().any(|h| h.eq_ignore_ascii_case(section)) {
            report.push(
                file,
                0,
                IssueLevel::Error,
                format!("Missing required section: {section}"),
            );
        }
    }
}

fn check_headings(file: &str, lines: &[&str], report: &mut ValidationReport) {
    let mut has_title = false;

    for (i, line) in lines.iter().enumerate() {
        let Some(title) = line.trim_start().strip_prefix("# ") else {
            continue;
        };
        if has_title {
            report.push(
                file,
                i + 1,
                IssueLevel::Warning,
                "Multiple H1 headings found. ADRs should have only one main title",
            );
            continue;
        }
        has_title = true;
        if title.trim().is_empty() {
            report.push(file, i + 1, IssueLevel::Error, "ADR title cannot be empty");
        }
    }

    if !has_title {
        report.push(file, 0, IssueLevel::Error, "ADR must have a main title (# Title)");
    }
}

fn check_style(file: &str, lines: &[&str], report: &mut ValidationReport) {
    for (i, line) in lines.iter().enumerate() {
        if line.chars().count() > MAX_LINE_LENGTH {
            report.push(
                file,
                i + 1,
                IssueLevel::Warning,
                format!("Line exceeds {MAX_LINE_LENGTH} characters"),
            );
        }
        if line.ends_with([' ', '\t']) {
            report.push(file, i + 1, IssueLevel::Warning, "Trailing whitespace");
        }
    }
}
