//! Collection loading.
//!
//! [`load_collection`] scans one directory, parses every record file and
//! returns a [`Collection`] sorted by record number.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::record::{AdrRecord, ParseError, RecordParser, is_valid_file_name};
use crate::settings::SiteConfig;

/// File name reserved for the record template.
pub const TEMPLATE_FILE: &str = "template.md";

/// Error loading a collection.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Directory or file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Two files share a record number.
    #[error("duplicate record number {number}: {first} and {second}")]
    DuplicateNumber {
        number: String,
        first: String,
        second: String,
    },
}

/// A file that was ignored during loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// Aggregate collection statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub adr_count: usize,
    pub diagram_count: usize,
}

/// Records sorted by number, with unique numbers.
///
/// Read-only after construction; share it with `Arc` between request
/// handlers.
#[derive(Debug, Default)]
pub struct Collection {
    records: Vec<AdrRecord>,
    skipped: Vec<SkippedFile>,
    fingerprint: String,
}

impl Collection {
    /// Build a collection from parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicateNumber`] if two records share a number.
    pub fn from_records(mut records: Vec<AdrRecord>) -> Result<Self, LoadError> {
        records.sort_by(|a, b| a.number.cmp(&b.number));

        if let Some(pair) = records.windows(2).find(|w| w[0].number == w[1].number) {
            return Err(LoadError::DuplicateNumber {
                number: pair[0].number.clone(),
                first: pair[0].file_name.clone(),
                second: pair[1].file_name.clone(),
            });
        }

        let mut hasher = Sha256::new();
        for record in &records {
            hasher.update(record.fingerprint.as_bytes());
        }

        Ok(Self {
            records,
            skipped: Vec::new(),
            fingerprint: hex::encode(hasher.finalize()),
        })
    }

    /// Records in ascending number order.
    #[must_use]
    pub fn records(&self) -> &[AdrRecord] {
        &self.records
    }

    /// Files ignored during loading.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            adr_count: self.records.len(),
            diagram_count: self.records.iter().map(|r| r.diagram_count).sum(),
        }
    }

    /// Number of records with exactly this status.
    #[must_use]
    pub fn count_by_status(&self, status: &str) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Locate a record and its position.
    #[must_use]
    pub fn find(&self, number: &str) -> Option<(usize, &AdrRecord)> {
        self.records
            .binary_search_by(|r| r.number.as_str().cmp(number))
            .ok()
            .map(|index| (index, &self.records[index]))
    }

    /// Previous and next records around `index`.
    #[must_use]
    pub fn neighbours(&self, index: usize) -> (Option<&AdrRecord>, Option<&AdrRecord>) {
        let previous = index.checked_sub(1).and_then(|i| self.records.get(i));
        let next = self.records.get(index + 1);
        (previous, next)
    }

    /// Hex SHA-256 over all record fingerprints in order.
    ///
    /// Changes whenever any record changes, is added or is removed.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Load all records from `dir`.
///
/// Directories, non-markdown files and [`TEMPLATE_FILE`] are ignored. Files
/// with a malformed name are skipped with a warning. A conversion failure
/// aborts the load when `config.fail_fast` is set and skips the file
/// otherwise.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the directory or a record cannot be read,
/// [`LoadError::Parse`] on conversion failure in fail-fast mode, and
/// [`LoadError::DuplicateNumber`] if two files share a number.
pub fn load_collection(dir: &Path, config: &SiteConfig) -> Result<Collection, LoadError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| LoadError::Io { path, source }
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err(dir))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let parser = RecordParser::new(config);
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err(&path))?;
        if file_type.is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(".md") || file_name == TEMPLATE_FILE {
            continue;
        }
        if !is_valid_file_name(&file_name) {
            tracing::warn!(file = %file_name, "Skipping file with invalid record name");
            skipped.push(SkippedFile {
                file_name,
                reason: "invalid file name".to_owned(),
            });
            continue;
        }

        let bytes = fs::read(&path).map_err(io_err(&path))?;
        let modified_at = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        match parser.parse(&path, &bytes, modified_at) {
            Ok(record) => {
                tracing::debug!(number = %record.number, path = %path.display(), "Loaded record");
                records.push(record);
            }
            Err(source) if config.fail_fast => return Err(LoadError::Parse { path, source }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unparsable record");
                skipped.push(SkippedFile {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut collection = Collection::from_records(records)?;
    collection.skipped = skipped;

    tracing::info!(
        dir = %dir.display(),
        records = collection.len(),
        skipped = collection.skipped.len(),
        "Loaded collection"
    );
    Ok(collection)
}
