//! Record layout constants and decoding for the title index.

use geometry::Point;

use crate::{Result, TitleError};

/// Fixed binary header preceding the name bytes.
pub const HEADER_LEN: usize = 15;

/// Upper bound on a whole record (header + name + LF). Bounds the scan
/// window used when snapping a raw byte position to the next record
/// boundary, and caps allocation on corrupt files.
pub const MAX_RECORD_LEN: usize = 512;

/// `file_nr` value marking a redirect record.
pub const REDIRECT_FILE_NR: u8 = 0xFF;

/// Where an article's compressed bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticlePointer {
    /// Data shard ordinal (`wikipedia_NN.dat`).
    pub file_nr: u8,
    /// Byte offset of the compressed block within the shard.
    pub block_start: u64,
    /// Byte offset of the article inside the decompressed block.
    pub block_offset: u64,
    /// Decoded article length in bytes.
    pub article_length: u64,
}

/// A title either points at article bytes or redirects to another record.
///
/// The on-disk format conflates the two (redirects reuse the pointer
/// fields); the in-memory model keeps them apart so the article reader
/// can only ever be handed a real pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLocation {
    /// A regular article.
    Article(ArticlePointer),
    /// A redirect; `target` is the offset of the target record inside the
    /// title file.
    Redirect { target: u64 },
}

/// One decoded record of the title index.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    /// Display name (raw, not normalized).
    pub name: String,
    /// Article pointer or redirect target.
    pub location: TitleLocation,
    /// This record's own byte offset in the title file.
    pub offset: u64,
    /// Geographic position, attached by the coordinate search.
    pub geolocation: Option<Point>,
    /// Header flag bits (reserved in current archives).
    pub flags: u16,
}

impl Title {
    /// Returns `true` if this title is a redirect marker.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self.location, TitleLocation::Redirect { .. })
    }

    /// The article pointer, or `None` for a redirect.
    #[must_use]
    pub fn article(&self) -> Option<&ArticlePointer> {
        match &self.location {
            TitleLocation::Article(ptr) => Some(ptr),
            TitleLocation::Redirect { .. } => None,
        }
    }
}

/// Decodes the pointer fields shared by title headers and redirect
/// targets: `file_nr` at byte 2, then three u32 LE values.
///
/// # Errors
///
/// Returns [`TitleError::Corrupt`] if `raw` is shorter than the header.
pub fn decode_pointer(raw: &[u8], offset: u64) -> Result<TitleLocation> {
    if raw.len() < HEADER_LEN {
        return Err(TitleError::Corrupt {
            offset,
            reason: "record shorter than fixed header",
        });
    }
    let file_nr = raw[2];
    let block_start = u64::from(byteio::u32le(&raw[3..7])?);
    let block_offset = u64::from(byteio::u32le(&raw[7..11])?);
    let article_length = u64::from(byteio::u32le(&raw[11..15])?);

    if file_nr == REDIRECT_FILE_NR {
        Ok(TitleLocation::Redirect { target: block_start })
    } else {
        Ok(TitleLocation::Article(ArticlePointer {
            file_nr,
            block_start,
            block_offset,
            article_length,
        }))
    }
}

/// Decodes one full record (header + name, **without** the trailing LF).
///
/// `offset` is the record's own position in the title file, stored on the
/// returned [`Title`] so coordinate hits can be dereferenced back to it.
///
/// # Errors
///
/// Returns [`TitleError::Corrupt`] on a short header or a name that is
/// not valid UTF-8.
pub fn decode_record(raw: &[u8], offset: u64) -> Result<Title> {
    let location = decode_pointer(raw, offset)?;
    let flags = byteio::u16le(&raw[0..2])?;

    let name = std::str::from_utf8(&raw[HEADER_LEN..])
        .map_err(|_| TitleError::Corrupt {
            offset,
            reason: "name is not valid UTF-8",
        })?
        .to_string();

    Ok(Title {
        name,
        location,
        offset,
        geolocation: None,
        flags,
    })
}
