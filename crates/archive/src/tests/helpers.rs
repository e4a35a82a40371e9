//! Disk fixtures: a minimal archive directory built piece by piece.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DEFAULT_METADATA: &str = "language = en\ndate = 2014-06-01\nnormalized_titles = 0\n";

/// Encodes one title record (header + name + LF).
pub fn title_record(
    file_nr: u8,
    block_start: u32,
    block_offset: u32,
    article_length: u32,
    name: &str,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.push(file_nr);
    out.extend_from_slice(&block_start.to_le_bytes());
    out.extend_from_slice(&block_offset.to_le_bytes());
    out.extend_from_slice(&article_length.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.push(b'\n');
    out
}

/// Compresses one payload into a standalone bzip2 stream.
pub fn bzip2_block(payload: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).expect("in-memory write");
    encoder.finish().expect("in-memory finish")
}

/// Encodes a coordinate leaf node: selector + (lat, lon, offset) entries.
pub fn coord_leaf(entries: &[(f32, f32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (lat, lon, title_offset) in entries {
        out.extend_from_slice(&lat.to_le_bytes());
        out.extend_from_slice(&lon.to_le_bytes());
        out.extend_from_slice(&title_offset.to_le_bytes());
    }
    out
}

/// An archive directory under construction.
pub struct ArchiveDir {
    pub tmp: TempDir,
}

impl ArchiveDir {
    pub fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> &Self {
        std::fs::write(self.file(name), bytes).expect("fixture write");
        self
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Writes metadata + a title file + one data shard holding the given
    /// articles, all in shard `wikipedia_00.dat`, one bzip2 block.
    ///
    /// Articles are concatenated into a single block; each title points
    /// at its slice. Returns the record offsets, in input order.
    pub fn with_articles(names_and_bodies: &[(&str, &str)]) -> (Self, Vec<u64>) {
        let dir = Self::new();
        dir.write("metadata.txt", DEFAULT_METADATA.as_bytes());

        let mut block = Vec::new();
        let mut titles = Vec::new();
        let mut offsets = Vec::new();
        let mut title_bytes = Vec::new();
        for (name, body) in names_and_bodies {
            titles.push((
                *name,
                block.len() as u32,
                body.as_bytes().len() as u32,
            ));
            block.extend_from_slice(body.as_bytes());
        }
        for (name, block_offset, len) in titles {
            offsets.push(title_bytes.len() as u64);
            title_bytes.extend_from_slice(&title_record(0, 0, block_offset, len, name));
        }

        dir.write("titles.idx", &title_bytes);
        dir.write("wikipedia_00.dat", &bzip2_block(&block));
        (dir, offsets)
    }
}
