//! # Quadindex - Disk-Resident Coordinate Quadtree
//!
//! Geographic search over one coordinate shard (`coordinates_NN.idx`).
//! Each shard is a quadtree over the whole earth, serialized depth-first
//! with the root node at byte 0.
//!
//! ## Node layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ selector (u16 LE)                                             │
//! │                                                               │
//! │ 0xFFFF -> INNER NODE (22 bytes total):                         │
//! │   center_lat (f32 LE) | center_lon (f32 LE)                   │
//! │   len_sw (u32 LE) | len_se (u32 LE) | len_nw (u32 LE)         │
//! │   children follow in SW, SE, NW, NE order; the NE length      │
//! │   is implicit (runs to the end of the subtree)                │
//! │                                                               │
//! │ otherwise -> LEAF with `selector` 12-byte entries:             │
//! │   lat (f32 LE) | lon (f32 LE) | title_offset (u32 LE)         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The on-disk float order is latitude first, longitude second; points
//! are constructed `(lon, lat)`. Only the bytes a node structurally needs
//! are read: 2 for a leaf selector, 22 for an inner header, 12 per leaf
//! entry.
//!
//! The descent is a plain synchronous join: children are visited in
//! order, hits accumulate in the caller's buffer, and the search is done
//! when the recursion unwinds. Completion needs no shared counter.

use byteio::RangeFile;
use geometry::{Point, Rect, WHOLE_EARTH};
use std::path::Path;

use thiserror::Error;

/// Marks an inner node in the selector field.
pub const INNER_NODE: u16 = 0xFFFF;

/// Inner node header: selector + center + three child lengths.
pub const INNER_HEADER_LEN: usize = 22;

/// Size of one leaf entry: 8 bytes of coordinates + title offset.
pub const LEAF_ENTRY_LEN: usize = 12;

/// Errors produced while descending a coordinate shard.
#[derive(Debug, Error)]
pub enum QuadError {
    /// An underlying ranged-read failure (including reads past the end of
    /// a truncated shard).
    #[error("coordinate shard read failed: {0}")]
    Io(#[from] byteio::ByteIoError),
}

pub type Result<T> = std::result::Result<T, QuadError>;

/// One coordinate hit: the title-index offset and the point that matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Offset of the title record inside `titles.idx`.
    pub title_offset: u64,
    /// The entry's geographic position.
    pub position: Point,
}

/// A single open coordinate shard.
pub struct CoordShard {
    file: RangeFile,
}

impl CoordShard {
    /// Opens a coordinate shard file.
    ///
    /// # Errors
    ///
    /// Propagates the underlying open failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: RangeFile::open(path)?,
        })
    }

    /// Wraps an already-open file.
    #[must_use]
    pub fn from_file(file: RangeFile) -> Self {
        Self { file }
    }

    /// Collects every entry inside `query` into `out`, stopping early
    /// once `limit` hits have accumulated (`None` = unbounded).
    ///
    /// `query` must be normalized. Hits are appended in on-disk order;
    /// distance sorting is the caller's concern.
    ///
    /// # Errors
    ///
    /// Propagates read failures; a structurally truncated shard surfaces
    /// as an out-of-range read.
    pub fn search(&self, query: &Rect, limit: Option<usize>, out: &mut Vec<Hit>) -> Result<()> {
        self.descend(0, WHOLE_EARTH, query, limit, out)
    }

    fn descend(
        &self,
        pos: u64,
        node_rect: Rect,
        query: &Rect,
        limit: Option<usize>,
        out: &mut Vec<Hit>,
    ) -> Result<()> {
        if full(limit, out) {
            return Ok(());
        }

        let selector = byteio::u16le(&self.file.read_at(pos, 2)?)?;
        if selector == INNER_NODE {
            self.descend_inner(pos, node_rect, query, limit, out)
        } else {
            self.scan_leaf(pos, selector as usize, query, limit, out)
        }
    }

    fn descend_inner(
        &self,
        pos: u64,
        node_rect: Rect,
        query: &Rect,
        limit: Option<usize>,
        out: &mut Vec<Hit>,
    ) -> Result<()> {
        let header = self.file.read_at(pos, INNER_HEADER_LEN)?;
        let center = read_point(&header[2..10])?;
        let len_sw = u64::from(byteio::u32le(&header[10..14])?);
        let len_se = u64::from(byteio::u32le(&header[14..18])?);
        let len_nw = u64::from(byteio::u32le(&header[18..22])?);

        let base = pos + INNER_HEADER_LEN as u64;
        let children = [
            (base, Rect::from_corners(node_rect.sw(), center)),
            (
                base + len_sw,
                Rect::from_corners(Point::new(center.lon, node_rect.south()), Point::new(node_rect.east(), center.lat)),
            ),
            (
                base + len_sw + len_se,
                Rect::from_corners(Point::new(node_rect.west(), center.lat), Point::new(center.lon, node_rect.north())),
            ),
            (
                base + len_sw + len_se + len_nw,
                Rect::from_corners(center, node_rect.ne()),
            ),
        ];

        for (child_pos, child_rect) in children {
            if full(limit, out) {
                return Ok(());
            }
            if child_rect.intersects(query) {
                self.descend(child_pos, child_rect, query, limit, out)?;
            }
        }
        Ok(())
    }

    fn scan_leaf(
        &self,
        pos: u64,
        entry_count: usize,
        query: &Rect,
        limit: Option<usize>,
        out: &mut Vec<Hit>,
    ) -> Result<()> {
        if entry_count == 0 {
            return Ok(());
        }
        let entries = self.file.read_at(pos + 2, entry_count * LEAF_ENTRY_LEN)?;
        for entry in entries.chunks_exact(LEAF_ENTRY_LEN) {
            if full(limit, out) {
                return Ok(());
            }
            let position = read_point(&entry[0..8])?;
            if query.contains_point(&position) {
                let title_offset = u64::from(byteio::u32le(&entry[8..12])?);
                out.push(Hit {
                    title_offset,
                    position,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CoordShard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordShard")
            .field("file", &self.file)
            .finish()
    }
}

/// Decodes the 8-byte on-disk coordinate pair: latitude first, longitude
/// second, constructing the point `(lon, lat)`.
fn read_point(buf: &[u8]) -> Result<Point> {
    let lat = byteio::f32le(&buf[0..4])?;
    let lon = byteio::f32le(&buf[4..8])?;
    Ok(Point::new(f64::from(lon), f64::from(lat)))
}

fn full(limit: Option<usize>, out: &[Hit]) -> bool {
    limit.is_some_and(|n| out.len() >= n)
}
