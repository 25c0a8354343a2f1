//! Scaffolding for new records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::loader::TEMPLATE_FILE;
use crate::settings::SiteConfig;

/// Highest number that fits the four-digit file name prefix.
const MAX_NUMBER: u32 = 9999;

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Error creating a record.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("title must contain at least one letter or digit")]
    EmptyTitle,

    #[error("unknown status '{status}', expected one of: {}", allowed.join(", "))]
    InvalidStatus { status: String, allowed: Vec<String> },

    #[error("ADR numbers are exhausted, 9999 is already taken")]
    NumberExhausted,

    #[error("ADR file already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parameters of a new record.
#[derive(Clone, Debug)]
pub struct NewAdr {
    pub title: String,
    pub status: String,
    /// Overwrite an existing file with the same name.
    pub force: bool,
}

impl NewAdr {
    /// A proposed record with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: "Proposed".to_owned(),
            force: false,
        }
    }
}

/// Creates numbered record files from the built-in skeleton.
pub struct AdrCreator<'a> {
    config: &'a SiteConfig,
}

impl<'a> AdrCreator<'a> {
    #[must_use]
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Write the next record into the source directory and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the title or status is invalid, the file exists
    /// and `force` is not set, or the directory cannot be read or written.
    pub fn create(&self, adr: &NewAdr) -> Result<PathBuf, CreateError> {
        self.create_on(adr, Local::now().date_naive())
    }

    fn create_on(&self, adr: &NewAdr, date: NaiveDate) -> Result<PathBuf, CreateError> {
        let slug = kebab_case(&adr.title);
        if slug.is_empty() {
            return Err(CreateError::EmptyTitle);
        }
        if !self.config.is_valid_status(&adr.status) {
            return Err(CreateError::InvalidStatus {
                status: adr.status.clone(),
                allowed: self.config.allowed_statuses.clone(),
            });
        }

        let dir = &self.config.source_dir;
        let number = next_number(dir)?;
        if number > MAX_NUMBER {
            return Err(CreateError::NumberExhausted);
        }
        let path = dir.join(format!("{number:04}-{slug}.md"));
        if path.exists() && !adr.force {
            return Err(CreateError::AlreadyExists(path));
        }

        let io_err = |source| CreateError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_err)?;
        fs::write(&path, skeleton(adr.title.trim(), &adr.status, date)).map_err(io_err)?;

        tracing::info!(path = %path.display(), number, "Created record");
        Ok(path)
    }
}

/// Highest record number in `dir` plus one. A missing directory starts at 1.
///
/// # Errors
///
/// Returns [`CreateError::Io`] if the directory exists but cannot be read.
pub fn next_number(dir: &Path) -> Result<u32, CreateError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
        Err(source) => {
            return Err(CreateError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let max = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".md") && name != TEMPLATE_FILE)
        .filter_map(|name| name.get(..4).and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

/// Lowercase `title` and join its alphanumeric runs with `-`.
#[must_use]
pub fn kebab_case(title: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_owned()
}

fn skeleton(title: &str, status: &str, date: NaiveDate) -> String {
    format!(
        "# {title}

## Status

{status}

## Context

*Describe the context and problem statement that led to this decision.*

The issue motivating this decision, and any context that influences or constrains the decision.

## Decision

*Describe the decision that was made.*

We will...

### Rationale

*Explain why this decision was made.*

### Alternatives Considered

*List other options that were considered and why they were not chosen.*

## Consequences

### Positive

- *List positive consequences of this decision*

### Negative

- *List negative consequences of this decision*

### Neutral

- *List neutral consequences that should be noted*

## Implementation

### Next Steps

- [ ] Task 1
- [ ] Task 2
- [ ] Task 3

### Timeline

*Describe the implementation timeline and milestones.*

## Related Decisions

*Link to related ADRs or decisions.*

---

*This ADR was created on {}*
",
        date.format("%B %-d, %Y")
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::record::{extract_status, extract_title};
    use crate::validator::{ValidationReport, Validator};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("Use PostgreSQL for Storage"), "use-postgresql-for-storage");
        assert_eq!(kebab_case("  API: v2 / REST!! "), "api-v2-rest");
        assert_eq!(kebab_case("???"), "");
    }

    #[test]
    fn test_next_number() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_number(&dir.path().join("missing")).unwrap(), 1);
        assert_eq!(next_number(dir.path()).unwrap(), 1);

        fs::write(dir.path().join("0001-a.md"), "").unwrap();
        fs::write(dir.path().join("0007-b.md"), "").unwrap();
        fs::write(dir.path().join("0009-notes.txt"), "").unwrap();
        fs::write(dir.path().join("template.md"), "").unwrap();
        assert_eq!(next_number(dir.path()).unwrap(), 8);
    }

    #[test]
    fn test_create_writes_valid_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(dir.path().join("adr"));
        let path = AdrCreator::new(&config)
            .create_on(&NewAdr::new("Use Postgres"), date())
            .unwrap();
        assert_eq!(path, dir.path().join("adr/0001-use-postgres.md"));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(extract_title(&content), "Use Postgres");
        assert_eq!(extract_status(&content), "Proposed");
        assert!(content.ends_with("*This ADR was created on March 5, 2024*\n"));

        let mut report = ValidationReport::default();
        Validator::new(&config, false).validate_content("0001-use-postgres.md", &content, &mut report);
        assert_eq!(report.issues, []);
    }

    #[test]
    fn test_create_increments_number() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(dir.path());
        let creator = AdrCreator::new(&config);
        creator.create_on(&NewAdr::new("First"), date()).unwrap();
        let second = creator.create_on(&NewAdr::new("Second"), date()).unwrap();
        assert_eq!(second, dir.path().join("0002-second.md"));
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(dir.path());
        let creator = AdrCreator::new(&config);

        let err = creator.create_on(&NewAdr::new("!!!"), date()).unwrap_err();
        assert!(matches!(err, CreateError::EmptyTitle));

        let adr = NewAdr {
            status: "Rejected".to_owned(),
            ..NewAdr::new("Title")
        };
        let err = creator.create_on(&adr, date()).unwrap_err();
        assert!(matches!(err, CreateError::InvalidStatus { .. }));
        assert!(err.to_string().contains("Proposed, Accepted"));
    }

    #[test]
    fn test_create_stops_after_last_number() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("9999-last.md"), "# Last\n").unwrap();
        let config = SiteConfig::new(dir.path());

        let err = AdrCreator::new(&config)
            .create_on(&NewAdr::new("Overflow"), date())
            .unwrap_err();
        assert!(matches!(err, CreateError::NumberExhausted));
        assert!(!dir.path().join("10000-overflow.md").exists());
    }

    #[test]
    fn test_existing_path_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        // Directories are ignored when numbering, so this one collides.
        fs::create_dir(dir.path().join("0001-title.md")).unwrap();
        let config = SiteConfig::new(dir.path());

        let err = AdrCreator::new(&config)
            .create_on(&NewAdr::new("Title"), date())
            .unwrap_err();
        assert!(matches!(err, CreateError::AlreadyExists(path) if path.ends_with("0001-title.md")));
    }
}
