//! # ByteIO - Ranged File Reads & Little-Endian Decoders
//!
//! The byte layer every other crate converges on: random-access reads of
//! byte ranges from archive files, plus the small pure decoders the binary
//! formats need (`u16`/`u32`/`f32` little-endian, hex, URL stripping).
//!
//! Archive files are opened once and shared read-only for the lifetime of
//! the reader. A persistent file handle is kept open, wrapped in a `Mutex`
//! so that reads can be issued through a shared `&self` reference; each
//! read is an independent seek + `read_exact` under the lock.
//!
//! ## Read contracts
//!
//! | Call | Past-EOF behaviour |
//! |------------------|------------------------------------|
//! | [`RangeFile::read_at`] | error ([`ByteIoError::OutOfRange`]) |
//! | [`RangeFile::read_up_to`] | short read (available prefix)   |
//!
//! All multi-byte integers in the archive formats are little-endian.

use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors produced by the byte layer.
#[derive(Debug, Error)]
pub enum ByteIoError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A ranged read extends past the end of the file.
    #[error("range {offset}+{len} out of bounds for file of {file_len} bytes")]
    OutOfRange { offset: u64, len: u64, file_len: u64 },

    /// A decoder was handed fewer bytes than the value needs.
    #[error("truncated field: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// A hex string contained a non-hex digit or had odd length.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, ByteIoError>;

/// A read-only file supporting ranged random-access reads.
///
/// The file length is captured at open time; archive files are immutable,
/// so the cached length stays valid for the lifetime of the handle.
pub struct RangeFile {
    /// Path the file was opened from (kept for diagnostics).
    path: PathBuf,
    /// Persistent file handle, wrapped in Mutex for interior mutability.
    file: Mutex<File>,
    /// Total file size in bytes, captured at open.
    len: u64,
}

impl RangeFile {
    /// Opens a file for ranged reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its metadata read.
    /// A missing file surfaces as `ByteIoError::Io` with
    /// `std::io::ErrorKind::NotFound`, which callers use to distinguish
    /// "absent" from other failures.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path: path_buf,
            file: Mutex::new(file),
            len,
        })
    }

    /// Total file size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads exactly `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ByteIoError::OutOfRange`] if `offset + len` exceeds the
    /// file size, or an I/O error from the underlying read.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(ByteIoError::OutOfRange {
                offset,
                len: len as u64,
                file_len: self.len,
            })?;
        if end > self.len {
            return Err(ByteIoError::OutOfRange {
                offset,
                len: len as u64,
                file_len: self.len,
            });
        }

        let mut buf = vec![0u8; len];
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("file lock poisoned: {}", e)))?;
        f.seek(SeekFrom::Start(offset))?;
        f.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads up to `len` bytes starting at `offset`, stopping at EOF.
    ///
    /// Returns an empty vector when `offset` is at or past the end of the
    /// file. Never errors on a short range, only on a real I/O failure.
    pub fn read_up_to(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if offset >= self.len {
            return Ok(Vec::new());
        }
        let available = (self.len - offset).min(len as u64) as usize;
        self.read_at(offset, available)
    }
}

impl std::fmt::Debug for RangeFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeFile")
            .field("path", &self.path)
            .field("len", &self.len)
            .finish()
    }
}

/// Decodes a little-endian `u16` from the front of `buf`.
///
/// # Errors
///
/// Returns [`ByteIoError::Truncated`] if `buf` holds fewer than 2 bytes.
pub fn u16le(buf: &[u8]) -> Result<u16> {
    if buf.len() < 2 {
        return Err(ByteIoError::Truncated {
            needed: 2,
            got: buf.len(),
        });
    }
    Ok(LittleEndian::read_u16(buf))
}

/// Decodes a little-endian `u32` from the front of `buf`.
///
/// # Errors
///
/// Returns [`ByteIoError::Truncated`] if `buf` holds fewer than 4 bytes.
pub fn u32le(buf: &[u8]) -> Result<u32> {
    if buf.len() < 4 {
        return Err(ByteIoError::Truncated {
            needed: 4,
            got: buf.len(),
        });
    }
    Ok(LittleEndian::read_u32(buf))
}

/// Decodes a little-endian `f32` from the front of `buf`.
///
/// # Errors
///
/// Returns [`ByteIoError::Truncated`] if `buf` holds fewer than 4 bytes.
pub fn f32le(buf: &[u8]) -> Result<f32> {
    if buf.len() < 4 {
        return Err(ByteIoError::Truncated {
            needed: 4,
            got: buf.len(),
        });
    }
    Ok(LittleEndian::read_f32(buf))
}

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Decodes a hex string (upper or lower case) into bytes.
///
/// # Errors
///
/// Returns [`ByteIoError::InvalidHex`] on odd length or non-hex digits.
pub fn hex_decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(ByteIoError::InvalidHex(s.to_string()));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let hi = hex_digit(pair[0]).ok_or_else(|| ByteIoError::InvalidHex(s.to_string()))?;
        let lo = hex_digit(pair[1]).ok_or_else(|| ByteIoError::InvalidHex(s.to_string()))?;
        out.push(hi << 4 | lo);
    }
    Ok(out)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Strips the query string and fragment from a URL-ish string.
///
/// Everything from the first `?` or `#` onwards is removed; a string with
/// neither is returned unchanged.
#[must_use]
pub fn strip_url_query_and_fragment(url: &str) -> &str {
    let cut = url
        .find(|c| c == '?' || c == '#')
        .unwrap_or(url.len());
    &url[..cut]
}
