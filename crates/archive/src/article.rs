//! Article read path: redirect resolution and the bzip2 streaming loop.
//!
//! An article lives at `(file_nr, block_start, block_offset,
//! article_length)`: `block_start` is the byte offset of a bzip2 stream
//! inside the data shard, and the article occupies
//! `[block_offset, block_offset + article_length)` of that stream's
//! decompressed output.
//!
//! Input is fed to the codec one chunk at a time; another chunk is read
//! from the shard only while the codec still wants input and the
//! decompressed prefix does not yet cover the requested slice. The output
//! buffer grows in chunk-sized steps, so a large block never inflates
//! past what the article actually needs.

use bzip2::{Decompress, Status};
use titles::{decode_pointer, Title, TitleLocation};
use tracing::debug;

use crate::{Archive, ArchiveError, Result};

/// Bytes of compressed input fed to the codec per round.
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Redirect hops tolerated before the chain is declared circular.
const MAX_REDIRECT_HOPS: usize = 8;

impl Archive {
    /// Resolves a redirect one hop: reads the 16-byte target window at
    /// the redirect's `block_start` inside the title file and returns the
    /// same title with the pointer fields rewritten.
    ///
    /// A non-redirect title is returned unchanged, so resolving twice is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Fails when the target window lies outside the title file or the
    /// title index is absent.
    pub fn resolve_redirect(&self, title: &Title) -> Result<Title> {
        match title.location {
            TitleLocation::Article(_) => Ok(title.clone()),
            TitleLocation::Redirect { target } => {
                let index = self.title_index()?;
                let window = index.read_target_window(target)?;
                let location = decode_pointer(&window, target)?;
                let mut resolved = title.clone();
                resolved.location = location;
                Ok(resolved)
            }
        }
    }

    /// Reads and decompresses an article body, decoding it as UTF-8.
    ///
    /// Redirects are resolved first (bounded hops). The returned string
    /// is exactly `article_length` bytes in the archive's storage
    /// encoding.
    ///
    /// # Errors
    ///
    /// * [`ArchiveError::MissingShard`] - the referenced data shard is absent.
    /// * [`ArchiveError::CorruptBlock`] - no bzip2 magic at `block_start`.
    /// * [`ArchiveError::DecompressionFailed`] - any other codec failure,
    ///   or an article that is not valid UTF-8.
    /// * [`ArchiveError::Truncated`] - the shard or the decompressed
    ///   block ends before the requested slice is covered.
    pub fn read_article(&self, title: &Title) -> Result<String> {
        let mut resolved = title.clone();
        let mut hops = 0;
        let ptr = loop {
            match resolved.location {
                TitleLocation::Article(p) => break p,
                TitleLocation::Redirect { .. } => {
                    hops += 1;
                    if hops > MAX_REDIRECT_HOPS {
                        return Err(ArchiveError::InvalidArchive(format!(
                            "redirect chain for {:?} exceeds {} hops",
                            title.name, MAX_REDIRECT_HOPS
                        )));
                    }
                    resolved = self.resolve_redirect(&resolved)?;
                }
            }
        };
        let shard = self.data_shard(ptr.file_nr)?;

        let needed = (ptr.block_offset + ptr.article_length) as usize;
        let mut decomp = Decompress::new(false);
        let mut out: Vec<u8> = Vec::with_capacity(needed.min(CHUNK_SIZE));
        let mut read_pos = ptr.block_start;
        let mut rounds = 0u32;

        'feed: while out.len() < needed {
            let chunk = shard.read_up_to(read_pos, CHUNK_SIZE)?;
            if chunk.is_empty() {
                // Ran off the end of the shard with the codec still hungry.
                return Err(ArchiveError::Truncated(format!(
                    "data shard {} ends inside block at {}",
                    ptr.file_nr, ptr.block_start
                )));
            }
            read_pos += chunk.len() as u64;
            rounds += 1;

            let mut consumed = 0;
            while consumed < chunk.len() {
                if out.len() == out.capacity() {
                    out.reserve(CHUNK_SIZE);
                }
                let before_in = decomp.total_in();
                let status = decomp
                    .decompress_vec(&chunk[consumed..], &mut out)
                    .map_err(|e| match e {
                        bzip2::Error::DataMagic => ArchiveError::CorruptBlock {
                            file_nr: ptr.file_nr,
                            block_start: ptr.block_start,
                        },
                        other => ArchiveError::DecompressionFailed(other.to_string()),
                    })?;
                consumed += (decomp.total_in() - before_in) as usize;

                if out.len() >= needed {
                    break 'feed;
                }
                if matches!(status, Status::StreamEnd) {
                    // The block ended and the requested slice still is not
                    // covered; more shard bytes belong to the next block.
                    return Err(ArchiveError::Truncated(format!(
                        "block at {} decompresses to {} bytes, article needs {}",
                        ptr.block_start,
                        out.len(),
                        needed
                    )));
                }
            }
        }

        debug!(
            file_nr = ptr.file_nr,
            block_start = ptr.block_start,
            rounds,
            decompressed = out.len(),
            "article block decompressed"
        );

        let slice = &out[ptr.block_offset as usize..needed];
        String::from_utf8(slice.to_vec()).map_err(|_| {
            ArchiveError::DecompressionFailed("article is not valid UTF-8".to_string())
        })
    }
}
