//! Math image lookup: classical binary search over the fixed-size
//! records of `math.idx`, then one ranged read of `math.dat`.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ hash (16 bytes) | pos (u32 LE) | len (u32 LE) │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Records are sorted by hash, so the hex-string comparison of the
//! original format is equivalent to comparing the raw hash bytes.

use std::cmp::Ordering;

use crate::{Archive, ArchiveError, Result};

/// Size of one math index record.
pub const MATH_RECORD_LEN: u64 = 24;

/// Bytes of content hash per record.
const HASH_LEN: usize = 16;

impl Archive {
    /// Looks up an inline math-rendering image by its content hash
    /// (hex-encoded, 16 bytes).
    ///
    /// # Errors
    ///
    /// * [`ArchiveError::NotFound`] - hash absent, malformed, or the
    ///   archive has no math files.
    /// * [`ArchiveError::Truncated`] - index entry points outside
    ///   `math.dat`.
    pub fn load_math_image(&self, hex_hash: &str) -> Result<Vec<u8>> {
        let (index, data) = match (&self.math_index, &self.math_data) {
            (Some(i), Some(d)) => (i, d),
            _ => {
                return Err(ArchiveError::NotFound(
                    "archive has no math index".to_string(),
                ))
            }
        };

        let hash = byteio::hex_decode(hex_hash)
            .map_err(|_| ArchiveError::NotFound(format!("malformed hash {:?}", hex_hash)))?;
        if hash.len() != HASH_LEN {
            return Err(ArchiveError::NotFound(format!(
                "hash {:?} is not {} bytes",
                hex_hash, HASH_LEN
            )));
        }

        let mut lo = 0u64;
        let mut hi = index.len() / MATH_RECORD_LEN;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let record = index.read_at(mid * MATH_RECORD_LEN, MATH_RECORD_LEN as usize)?;
            match record[..HASH_LEN].cmp(&hash) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    let pos = u64::from(byteio::u32le(&record[16..20])?);
                    let len = byteio::u32le(&record[20..24])? as usize;
                    return Ok(data.read_at(pos, len)?);
                }
            }
        }

        Err(ArchiveError::NotFound(format!("math image {}", hex_hash)))
    }
}
