//! # Archive - Evopedia Archive Reader
//!
//! The central orchestrator that ties the [`titles`], [`quadindex`],
//! [`geometry`], and [`byteio`] crates into a complete offline reader for
//! one Evopedia archive directory.
//!
//! ## Architecture
//!
//! ```text
//! Client query
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                  ARCHIVE                      │
//! │                                               │
//! │ by name / prefix ──> titles.idx binary search │
//! │ read_article ──────> wikipedia_NN.dat         │
//! │                      bzip2 streaming loop     │
//! │ titles_in_coords ──> coordinates_NN.idx       │
//! │                      quadtree descent + sort  │
//! │ load_math_image ───> math.idx binary search   │
//! │                      + math.dat ranged read   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                                |
//! |--------------|--------------------------------------------------------|
//! | `lib.rs`     | `Archive` struct, descriptor slots, accessors, errors  |
//! | [`metadata`] | `metadata.txt` parsing (`key = value` lines)           |
//! | `init`       | Construction: flat file list or directory enumeration  |
//! | `article`    | Article decompression and redirect resolution          |
//! | `geo`        | Rectangle search across coordinate shards              |
//! | `math`       | Math-image lookup by content hash                      |
//!
//! ## Files of one archive
//!
//! ```text
//! metadata.txt        required  plain-text key = value
//! titles.idx          required  sorted LF-terminated title records
//! titles_search.idx   optional  opaque prefix accelerator
//! wikipedia_NN.dat    1..N      concatenated bzip2 blocks
//! coordinates_NN.idx  0..M      quadtree per shard (numbered from 01)
//! math.idx            optional  24-byte hash records, sorted
//! math.dat            optional  raw image bytes
//! ```
//!
//! All archive files are immutable after creation; every descriptor slot
//! is initialized once during construction and read-only afterwards, so
//! queries share the archive freely through `&self`.

mod article;
mod geo;
mod init;
mod math;
pub mod metadata;

pub use article::CHUNK_SIZE;
pub use geometry::{Point, Rect};
pub use metadata::Metadata;
pub use titles::{ArticlePointer, NormalizeFn, Title, TitleLocation};

use byteio::RangeFile;
use quadindex::CoordShard;
use std::path::{Path, PathBuf};
use titles::TitleIndex;

use thiserror::Error;

/// Errors surfaced by archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A file or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A read ran past the end of a file or compressed block.
    #[error("truncated read: {0}")]
    Truncated(String),

    /// A compressed block does not start with the bzip2 magic.
    #[error("corrupt block at {block_start} in data shard {file_nr}: no bzip2 magic")]
    CorruptBlock { file_nr: u8, block_start: u64 },

    /// The bzip2 codec failed for a reason other than a missing magic.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// A title references a data shard the archive does not have.
    #[error("data shard {file_nr} is missing")]
    MissingShard { file_nr: u8 },

    /// An underlying storage failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A required file is absent or the metadata does not parse.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
}

impl From<byteio::ByteIoError> for ArchiveError {
    fn from(err: byteio::ByteIoError) -> Self {
        match err {
            byteio::ByteIoError::Io(io_err) => ArchiveError::Io(io_err),
            byteio::ByteIoError::OutOfRange { .. } | byteio::ByteIoError::Truncated { .. } => {
                ArchiveError::Truncated(err.to_string())
            }
            byteio::ByteIoError::InvalidHex(s) => ArchiveError::NotFound(format!("bad hex: {}", s)),
        }
    }
}

impl From<titles::TitleError> for ArchiveError {
    fn from(err: titles::TitleError) -> Self {
        match err {
            titles::TitleError::Io(inner) => inner.into(),
            titles::TitleError::Corrupt { .. } => ArchiveError::InvalidArchive(err.to_string()),
        }
    }
}

impl From<quadindex::QuadError> for ArchiveError {
    fn from(err: quadindex::QuadError) -> Self {
        match err {
            quadindex::QuadError::Io(inner) => inner.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// One open archive: parsed metadata plus a slot per archive file.
///
/// Construction goes through [`Archive::open`] (directory enumeration) or
/// [`Archive::from_files`] (explicit file list); both end in the same
/// ready state. An archive is *ready* when the title index and at least
/// one data shard are present; everything else is optional.
pub struct Archive {
    /// Directory the archive was opened from.
    pub(crate) dir: PathBuf,
    /// Sorted title index (`titles.idx`).
    pub(crate) title_index: Option<TitleIndex>,
    /// Opaque optional prefix accelerator (`titles_search.idx`). Carried
    /// for completeness; prefix lookup uses the binary-search path.
    pub(crate) search_index: Option<PathBuf>,
    /// Data shards, slot == the NN in `wikipedia_NN.dat`. Slots with no
    /// file (typically slot 0) stay `None`.
    pub(crate) data_shards: Vec<Option<RangeFile>>,
    /// Coordinate shards, slot == NN - 1 for `coordinates_NN.idx`.
    pub(crate) coord_shards: Vec<Option<CoordShard>>,
    /// Math image index (`math.idx`).
    pub(crate) math_index: Option<RangeFile>,
    /// Math image data (`math.dat`).
    pub(crate) math_data: Option<RangeFile>,
    /// Parsed `metadata.txt`.
    pub(crate) metadata: Metadata,
    /// Normalization applied to query and on-disk titles alike: identity
    /// unless the metadata declares normalized titles.
    pub(crate) normalize: NormalizeFn,
}

impl Archive {
    /// Returns `true` when the archive can serve article queries: the
    /// title index and at least one data shard are present.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.title_index.is_some() && self.data_shards.iter().any(Option::is_some)
    }

    /// The normalization function in effect for this archive.
    #[must_use]
    pub fn normalize_fn(&self) -> NormalizeFn {
        self.normalize.clone()
    }

    /// Parsed archive metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Archive content language (from `metadata.txt`).
    #[must_use]
    pub fn language(&self) -> &str {
        &self.metadata.language
    }

    /// Dump date (from `metadata.txt`).
    #[must_use]
    pub fn date(&self) -> &str {
        &self.metadata.date
    }

    /// Whether on-disk titles are stored normalized.
    #[must_use]
    pub fn normalized_titles(&self) -> bool {
        self.metadata.normalized_titles
    }

    /// Directory the archive was opened from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of data shards present.
    #[must_use]
    pub fn data_shard_count(&self) -> usize {
        self.data_shards.iter().filter(|s| s.is_some()).count()
    }

    /// Number of coordinate shards present.
    #[must_use]
    pub fn coord_shard_count(&self) -> usize {
        self.coord_shards.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if the math image index and data are both present.
    #[must_use]
    pub fn has_math(&self) -> bool {
        self.math_index.is_some() && self.math_data.is_some()
    }

    /// Returns `true` if the optional prefix accelerator file is present.
    #[must_use]
    pub fn has_search_index(&self) -> bool {
        self.search_index.is_some()
    }

    /// Exact lookup by display name.
    ///
    /// # Errors
    ///
    /// Fails if the title index is absent or unreadable.
    pub fn title_by_name(&self, name: &str) -> Result<Option<Title>> {
        Ok(self.title_index()?.by_name(name)?)
    }

    /// Titles whose normalized name starts with the normalized prefix,
    /// in on-disk order, at most `max` of them.
    ///
    /// # Errors
    ///
    /// Fails if the title index is absent or unreadable.
    pub fn titles_with_prefix(&self, prefix: &str, max: usize) -> Result<Vec<Title>> {
        Ok(self.title_index()?.with_prefix(prefix, max)?)
    }

    /// Up to `count` consecutive titles starting at record boundary
    /// `offset` in the title index.
    ///
    /// # Errors
    ///
    /// Fails if the title index is absent or unreadable.
    pub fn titles_from_offset(&self, offset: u64, count: usize) -> Result<Vec<Title>> {
        Ok(self.title_index()?.titles_from(offset, count)?)
    }

    /// A uniformly random title, or `None` for an empty index.
    ///
    /// # Errors
    ///
    /// Fails if the title index is absent or unreadable.
    pub fn random_title(&self) -> Result<Option<Title>> {
        Ok(self.title_index()?.random()?)
    }

    /// The title index, or `InvalidArchive` when `titles.idx` is absent.
    pub(crate) fn title_index(&self) -> Result<&TitleIndex> {
        self.title_index
            .as_ref()
            .ok_or_else(|| ArchiveError::InvalidArchive("title index not loaded".to_string()))
    }

    /// The data shard for `file_nr`, or `MissingShard`.
    pub(crate) fn data_shard(&self, file_nr: u8) -> Result<&RangeFile> {
        self.data_shards
            .get(file_nr as usize)
            .and_then(Option::as_ref)
            .ok_or(ArchiveError::MissingShard { file_nr })
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("dir", &self.dir)
            .field("language", &self.metadata.language)
            .field("date", &self.metadata.date)
            .field("normalized_titles", &self.metadata.normalized_titles)
            .field("ready", &self.is_ready())
            .field("data_shards", &self.data_shard_count())
            .field("coord_shards", &self.coord_shard_count())
            .field("has_math", &self.has_math())
            .finish()
    }
}

#[cfg(test)]
mod tests;
