//! # Metadata - `metadata.txt` parsing
//!
//! Every archive carries a plain-text metadata file with one `key = value`
//! pair per line:
//!
//! ```text
//! language = en
//! date = 2014-06-01
//! normalized_titles = 1
//! ```
//!
//! Lines starting with `#` are comments. Empty lines are ignored.
//! `language` and `date` are required; `normalized_titles` defaults to
//! true when absent, and only the literal value `0` turns it off. Keys
//! this reader does not interpret are retained verbatim; real dumps
//! carry extras such as `version` or `article_count`.

use std::collections::BTreeMap;

use crate::{ArchiveError, Result};

/// Name of the metadata file within the archive directory.
pub const METADATA_FILENAME: &str = "metadata.txt";

/// Parsed archive metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Content language code, e.g. `en`.
    pub language: String,
    /// Dump date, e.g. `2014-06-01`.
    pub date: String,
    /// Whether on-disk titles are stored normalized.
    pub normalized_titles: bool,
    /// Keys the reader does not interpret, kept in file order.
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Parses the contents of a `metadata.txt` file.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArchive`] when `language` or `date`
    /// is missing, or when a non-blank line has no `=` separator.
    pub fn parse(text: &str) -> Result<Self> {
        let mut language = None;
        let mut date = None;
        let mut normalized_titles = true;
        let mut extra = BTreeMap::new();

        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();

            // Skip empty lines and comments.
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (key, value) = trimmed.split_once('=').ok_or_else(|| {
                ArchiveError::InvalidArchive(format!(
                    "metadata line {}: expected 'key = value', got {:?}",
                    line_num + 1,
                    trimmed
                ))
            })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "language" => language = Some(value.to_string()),
                "date" => date = Some(value.to_string()),
                "normalized_titles" => normalized_titles = value != "0",
                other => {
                    extra.insert(other.to_string(), value.to_string());
                }
            }
        }

        let language = language
            .ok_or_else(|| ArchiveError::InvalidArchive("metadata is missing 'language'".to_string()))?;
        let date = date
            .ok_or_else(|| ArchiveError::InvalidArchive("metadata is missing 'date'".to_string()))?;

        Ok(Self {
            language,
            date,
            normalized_titles,
            extra,
        })
    }
}
