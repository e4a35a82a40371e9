//! # Titles - Sorted Title Index
//!
//! Read-only access to `titles.idx`, the sorted index of every article in
//! an archive. The file is a sequence of variable-length records, each
//! terminated by a single LF byte:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ flags (u16 LE) | file_nr (u8) | block_start (u32 LE)          │
//! │ block_offset (u32 LE) | article_length (u32 LE)               │
//! │ name (UTF-8, variable) | 0x0A                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are sorted by the *normalized* name, so both exact and prefix
//! lookup reduce to one binary search over raw bytes: probe a midpoint,
//! snap forward to the next record boundary (LF + 1), decode, compare.
//! The same normalization function is applied to the query and to every
//! on-disk name; comparisons never mix normalized and raw strings.
//!
//! A `file_nr` of `0xFF` marks a redirect: `block_start` is then the byte
//! offset of the target record inside the title file itself, not a
//! position in any data shard.

mod format;
mod index;

pub use format::{
    decode_pointer, decode_record, ArticlePointer, Title, TitleLocation, HEADER_LEN,
    MAX_RECORD_LEN, REDIRECT_FILE_NR,
};
pub use index::{Cursor, TitleIndex};

use std::sync::Arc;

use thiserror::Error;

/// A normalization function applied to titles before comparison.
///
/// Must be pure, deterministic, and idempotent. The language-specific
/// folding tables live outside this crate; archives that do not declare
/// normalized titles use [`identity_normalizer`].
pub type NormalizeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The identity normalization, for archives with raw (unnormalized) titles.
#[must_use]
pub fn identity_normalizer() -> NormalizeFn {
    Arc::new(|s: &str| s.to_string())
}

/// A plain Unicode case fold, the default for normalized archives when the
/// caller supplies no language-specific folding function.
#[must_use]
pub fn casefold_normalizer() -> NormalizeFn {
    Arc::new(|s: &str| s.to_lowercase())
}

/// Errors that can occur while reading the title index.
#[derive(Debug, Error)]
pub enum TitleError {
    /// An underlying ranged-read failure.
    #[error("title index read failed: {0}")]
    Io(#[from] byteio::ByteIoError),

    /// A record could not be decoded.
    #[error("corrupt title record at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, TitleError>;

#[cfg(test)]
mod tests;
