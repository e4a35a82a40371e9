//! Title index reader: sequential cursor, prefix binary search, lookups.

use byteio::RangeFile;
use rand::Rng;
use std::path::Path;

use crate::format::{decode_record, Title, MAX_RECORD_LEN};
use crate::{NormalizeFn, Result, TitleError};

/// Reads the sorted title index for exact, prefix, and random lookups.
///
/// A persistent handle to `titles.idx` is kept open for the lifetime of
/// the reader; every lookup issues independent ranged reads, so `&self`
/// suffices throughout and no lookup observes another's cursor.
pub struct TitleIndex {
    file: RangeFile,
    normalize: NormalizeFn,
}

impl TitleIndex {
    /// Opens `titles.idx` with the given normalization function.
    ///
    /// # Errors
    ///
    /// Propagates the underlying open failure; a missing file surfaces
    /// with `std::io::ErrorKind::NotFound`.
    pub fn open<P: AsRef<Path>>(path: P, normalize: NormalizeFn) -> Result<Self> {
        Ok(Self {
            file: RangeFile::open(path)?,
            normalize,
        })
    }

    /// Wraps an already-open file.
    #[must_use]
    pub fn from_file(file: RangeFile, normalize: NormalizeFn) -> Self {
        Self { file, normalize }
    }

    /// Size of the underlying index file in bytes.
    #[must_use]
    pub fn file_len(&self) -> u64 {
        self.file.len()
    }

    /// Applies this index's normalization function.
    #[must_use]
    pub fn normalize(&self, s: &str) -> String {
        (self.normalize)(s)
    }

    /// Reads the 16-byte redirect target window at `offset` inside the
    /// title file (the first bytes of the target record).
    ///
    /// # Errors
    ///
    /// Fails if the window extends past the end of the file.
    pub fn read_target_window(&self, offset: u64) -> Result<Vec<u8>> {
        Ok(self.file.read_at(offset, 16)?)
    }

    /// Decodes the record starting exactly at `offset`.
    ///
    /// Returns `None` at end of file. `offset` must be a record boundary;
    /// behaviour on a mid-record offset is undefined (the bytes decode as
    /// garbage or fail as corrupt).
    ///
    /// # Errors
    ///
    /// Returns [`TitleError::Corrupt`] on an unterminated or over-long
    /// record.
    pub fn read_record_at(&self, offset: u64) -> Result<Option<Title>> {
        let buf = self.file.read_up_to(offset, MAX_RECORD_LEN)?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(lf) => Ok(Some(decode_record(&buf[..lf], offset)?)),
            None if buf.len() == MAX_RECORD_LEN => Err(TitleError::Corrupt {
                offset,
                reason: "record exceeds maximum length",
            }),
            None => Err(TitleError::Corrupt {
                offset,
                reason: "unterminated record at end of file",
            }),
        }
    }

    /// Sequential cursor over records, starting at `offset`.
    ///
    /// `offset` must be a record boundary (0, or one past any LF).
    #[must_use]
    pub fn cursor_at(&self, offset: u64) -> Cursor<'_> {
        Cursor {
            index: self,
            pos: offset,
        }
    }

    /// Returns the offset of the first record starting strictly after
    /// `pos`: the byte after the next LF, or the file size if none.
    ///
    /// # Errors
    ///
    /// Returns [`TitleError::Corrupt`] if no LF appears within the
    /// maximum record length (the record containing `pos` is over-long).
    fn boundary_after(&self, pos: u64) -> Result<u64> {
        let buf = self.file.read_up_to(pos, MAX_RECORD_LEN)?;
        match buf.iter().position(|&b| b == b'\n') {
            Some(lf) => Ok(pos + lf as u64 + 1),
            None if buf.len() == MAX_RECORD_LEN => Err(TitleError::Corrupt {
                offset: pos,
                reason: "record exceeds maximum length",
            }),
            // Trailing bytes with no LF: nothing decodable after `pos`.
            None => Ok(self.file.len()),
        }
    }

    /// Offset of the first record whose normalized name is `>=` the
    /// normalized prefix, or the file size if every record sorts earlier.
    ///
    /// Binary search over raw byte positions: each probe snaps its
    /// midpoint forward to the next record boundary and compares that
    /// record's normalized name against the target.
    ///
    /// # Errors
    ///
    /// Propagates read failures and corrupt-record errors from probes.
    pub fn find_prefix_offset(&self, prefix: &str) -> Result<u64> {
        let size = self.file.len();
        if size == 0 {
            return Ok(0);
        }
        let target = self.normalize(prefix);

        // The record at offset 0 has no preceding LF, so the snap-forward
        // probe can never land on it. Check it up front.
        match self.read_record_at(0)? {
            Some(first) if self.normalize(&first.name) >= target => return Ok(0),
            Some(_) => {}
            None => return Ok(0),
        }

        // Invariant: the probe predicate "first record strictly after pos
        // sorts >= target" is monotone in pos (records are sorted).
        let mut lo = 0u64;
        let mut hi = size;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let boundary = self.boundary_after(mid)?;
            let record_ge_target = match self.read_record_at(boundary)? {
                Some(t) => self.normalize(&t.name) >= target,
                None => true,
            };
            if record_ge_target {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        if hi >= size {
            return Ok(size);
        }
        self.boundary_after(hi)
    }

    /// Exact lookup by display name.
    ///
    /// Scans from the prefix offset while the normalized names still
    /// match, returning the first record whose **raw** name equals the
    /// query, or `None` once normalization no longer matches.
    ///
    /// # Errors
    ///
    /// Propagates read failures and corrupt-record errors.
    pub fn by_name(&self, name: &str) -> Result<Option<Title>> {
        let target = self.normalize(name);
        let offset = self.find_prefix_offset(&target)?;
        let mut cursor = self.cursor_at(offset);

        while let Some(title) = cursor.advance()? {
            if self.normalize(&title.name) != target {
                return Ok(None);
            }
            if title.name == name {
                return Ok(Some(title));
            }
        }
        Ok(None)
    }

    /// All titles whose normalized name starts with the normalized
    /// prefix, in on-disk order, at most `max` of them.
    ///
    /// # Errors
    ///
    /// Propagates read failures and corrupt-record errors.
    pub fn with_prefix(&self, prefix: &str, max: usize) -> Result<Vec<Title>> {
        let target = self.normalize(prefix);
        let offset = self.find_prefix_offset(&target)?;
        let mut cursor = self.cursor_at(offset);
        let mut out = Vec::new();

        while out.len() < max {
            match cursor.advance()? {
                Some(title) if self.normalize(&title.name).starts_with(&target) => {
                    out.push(title);
                }
                _ => break,
            }
        }
        Ok(out)
    }

    /// Up to `count` consecutive titles starting at the record boundary
    /// `offset`.
    ///
    /// # Errors
    ///
    /// Propagates read failures and corrupt-record errors.
    pub fn titles_from(&self, offset: u64, count: usize) -> Result<Vec<Title>> {
        let mut cursor = self.cursor_at(offset);
        let mut out = Vec::with_capacity(count.min(64));
        while out.len() < count {
            match cursor.advance()? {
                Some(title) => out.push(title),
                None => break,
            }
        }
        Ok(out)
    }

    /// A random title: picks a uniform byte offset, snaps forward to the
    /// next record boundary, and decodes. Landing inside the last record
    /// wraps around to the first.
    ///
    /// Returns `None` only for an empty index.
    ///
    /// # Errors
    ///
    /// Propagates read failures and corrupt-record errors.
    pub fn random(&self) -> Result<Option<Title>> {
        let size = self.file.len();
        if size == 0 {
            return Ok(None);
        }
        let pos = rand::thread_rng().gen_range(0..size);
        let boundary = self.boundary_after(pos)?;
        match self.read_record_at(boundary)? {
            Some(title) => Ok(Some(title)),
            None => self.read_record_at(0),
        }
    }
}

impl std::fmt::Debug for TitleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleIndex")
            .field("file", &self.file)
            .finish()
    }
}

/// Sequential record cursor. Created by [`TitleIndex::cursor_at`].
pub struct Cursor<'a> {
    index: &'a TitleIndex,
    pos: u64,
}

impl Cursor<'_> {
    /// Decodes the record at the cursor and advances past its LF.
    ///
    /// Returns `None` at end of index.
    ///
    /// # Errors
    ///
    /// Returns [`TitleError::Corrupt`] on an undecodable record; the
    /// cursor does not advance on error.
    pub fn advance(&mut self) -> Result<Option<Title>> {
        match self.index.read_record_at(self.pos)? {
            Some(title) => {
                // Header + name + the LF terminator.
                self.pos += (crate::HEADER_LEN + title.name.len() + 1) as u64;
                Ok(Some(title))
            }
            None => Ok(None),
        }
    }

    /// The byte offset the next `advance` will read from.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }
}
