//! Archive construction: flat file list classification and directory
//! enumeration. Both paths populate the same descriptor slots and end in
//! the same ready state.

use byteio::RangeFile;
use quadindex::CoordShard;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use titles::{casefold_normalizer, identity_normalizer, NormalizeFn, TitleIndex};
use tracing::{debug, warn};

use crate::metadata::{Metadata, METADATA_FILENAME};
use crate::{Archive, ArchiveError, Result};

/// Name of the title index within the archive directory.
pub const TITLES_FILENAME: &str = "titles.idx";
/// Name of the optional prefix accelerator.
pub const SEARCH_INDEX_FILENAME: &str = "titles_search.idx";
/// Name of the optional math image index.
pub const MATH_INDEX_FILENAME: &str = "math.idx";
/// Name of the optional math image data file.
pub const MATH_DATA_FILENAME: &str = "math.dat";

/// Descriptor slots filled during construction.
#[derive(Default)]
struct Slots {
    title_file: Option<RangeFile>,
    search_index: Option<PathBuf>,
    data_shards: Vec<Option<RangeFile>>,
    coord_shards: Vec<Option<CoordShard>>,
    math_index: Option<RangeFile>,
    math_data: Option<RangeFile>,
    metadata: Option<Metadata>,
}

impl Slots {
    fn put_data_shard(&mut self, slot: usize, file: RangeFile) {
        if self.data_shards.len() <= slot {
            self.data_shards.resize_with(slot + 1, || None);
        }
        self.data_shards[slot] = Some(file);
    }

    fn put_coord_shard(&mut self, slot: usize, shard: CoordShard) {
        if self.coord_shards.len() <= slot {
            self.coord_shards.resize_with(slot + 1, || None);
        }
        self.coord_shards[slot] = Some(shard);
    }
}

/// Extracts NN from `wikipedia_NN.dat`. The slot index equals the
/// two-digit number in the name; slot 0 is typically empty in real dumps.
fn data_shard_slot(name: &str) -> Option<usize> {
    let nn = name.strip_prefix("wikipedia_")?.strip_suffix(".dat")?;
    if nn.len() == 2 && nn.bytes().all(|b| b.is_ascii_digit()) {
        nn.parse().ok()
    } else {
        None
    }
}

/// Extracts NN from `coordinates_NN.idx`; files are numbered from 01 and
/// land in slot NN - 1.
fn coord_shard_slot(name: &str) -> Option<usize> {
    let nn = name.strip_prefix("coordinates_")?.strip_suffix(".idx")?;
    if nn.len() == 2 && nn.bytes().all(|b| b.is_ascii_digit()) {
        nn.parse::<usize>().ok()?.checked_sub(1)
    } else {
        None
    }
}

/// Shard file name for a data slot.
fn data_shard_name(slot: usize) -> String {
    format!("wikipedia_{:02}.dat", slot)
}

/// Shard file name for a coordinate slot.
fn coord_shard_name(slot: usize) -> String {
    format!("coordinates_{:02}.idx", slot + 1)
}

impl Archive {
    /// Opens an archive by enumerating `dir`, with the default case-fold
    /// normalizer for normalized archives.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArchive`] when `titles.idx` or
    /// `metadata.txt` is absent or unparseable, and propagates I/O
    /// failures other than NotFound encountered during enumeration.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open_with(dir, casefold_normalizer())
    }

    /// Opens an archive by enumerating `dir`, folding titles with the
    /// supplied normalizer when the metadata declares normalized titles.
    ///
    /// Probing order: `titles.idx` (required), `titles_search.idx`
    /// (optional, silent when absent), `metadata.txt` (required),
    /// `math.idx` + `math.dat` (warn on error), then `wikipedia_00.dat`,
    /// `01`, … until the first NotFound, then `coordinates_01.idx`, …
    /// until the first NotFound.
    ///
    /// # Errors
    ///
    /// As for [`Archive::open`].
    pub fn open_with<P: AsRef<Path>>(dir: P, folding: NormalizeFn) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut slots = Slots::default();

        slots.title_file = Some(
            RangeFile::open(dir.join(TITLES_FILENAME)).map_err(|e| {
                ArchiveError::InvalidArchive(format!("cannot open {}: {}", TITLES_FILENAME, e))
            })?,
        );

        let search_path = dir.join(SEARCH_INDEX_FILENAME);
        match RangeFile::open(&search_path) {
            Ok(_) => slots.search_index = Some(search_path),
            Err(e) if is_not_found(&e) => {}
            Err(e) => warn!(file = SEARCH_INDEX_FILENAME, error = %e, "prefix accelerator unreadable"),
        }

        let metadata_text = std::fs::read_to_string(dir.join(METADATA_FILENAME)).map_err(|e| {
            ArchiveError::InvalidArchive(format!("cannot read {}: {}", METADATA_FILENAME, e))
        })?;
        slots.metadata = Some(Metadata::parse(&metadata_text)?);

        match RangeFile::open(dir.join(MATH_INDEX_FILENAME)) {
            Ok(f) => slots.math_index = Some(f),
            Err(e) if is_not_found(&e) => {}
            Err(e) => warn!(file = MATH_INDEX_FILENAME, error = %e, "math index unreadable"),
        }
        match RangeFile::open(dir.join(MATH_DATA_FILENAME)) {
            Ok(f) => slots.math_data = Some(f),
            Err(e) if is_not_found(&e) => {}
            Err(e) => warn!(file = MATH_DATA_FILENAME, error = %e, "math data unreadable"),
        }

        // Data shards: 00, 01, ... until the first missing file.
        for slot in 0.. {
            match RangeFile::open(dir.join(data_shard_name(slot))) {
                Ok(f) => slots.put_data_shard(slot, f),
                Err(e) if is_not_found(&e) => break,
                Err(e) => return Err(e.into()),
            }
        }

        // Coordinate shards: 01, 02, ... until the first missing file.
        for slot in 0.. {
            match CoordShard::open(dir.join(coord_shard_name(slot))) {
                Ok(s) => slots.put_coord_shard(slot, s),
                Err(quadindex::QuadError::Io(e)) if is_not_found(&e) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Self::assemble(dir, slots, folding)
    }

    /// Builds an archive from an explicit list of file names inside
    /// `dir`, with the default case-fold normalizer.
    ///
    /// # Errors
    ///
    /// As for [`Archive::from_files_with`].
    pub fn from_files<P: AsRef<Path>>(dir: P, names: &[&str]) -> Result<Self> {
        Self::from_files_with(dir, names, casefold_normalizer())
    }

    /// Builds an archive from an explicit list of file names inside
    /// `dir`.
    ///
    /// Each name is classified: the exact names `metadata.txt`,
    /// `titles.idx`, `titles_search.idx`, `math.idx`, and `math.dat` go
    /// to their slots; `wikipedia_NN.dat` goes to data slot NN;
    /// `coordinates_NN.idx` goes to coordinate slot NN − 1. Unrecognized
    /// names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArchive`] when `metadata.txt` is
    /// not in the list or does not parse; listed files that fail to open
    /// propagate their I/O error.
    pub fn from_files_with<P: AsRef<Path>>(
        dir: P,
        names: &[&str],
        folding: NormalizeFn,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut slots = Slots::default();

        for &name in names {
            let path = dir.join(name);
            match name {
                METADATA_FILENAME => {
                    let text = std::fs::read_to_string(&path).map_err(|e| {
                        ArchiveError::InvalidArchive(format!("cannot read {}: {}", name, e))
                    })?;
                    slots.metadata = Some(Metadata::parse(&text)?);
                }
                TITLES_FILENAME => slots.title_file = Some(RangeFile::open(&path)?),
                SEARCH_INDEX_FILENAME => slots.search_index = Some(path),
                MATH_INDEX_FILENAME => slots.math_index = Some(RangeFile::open(&path)?),
                MATH_DATA_FILENAME => slots.math_data = Some(RangeFile::open(&path)?),
                other => {
                    if let Some(slot) = data_shard_slot(other) {
                        slots.put_data_shard(slot, RangeFile::open(&path)?);
                    } else if let Some(slot) = coord_shard_slot(other) {
                        slots.put_coord_shard(slot, CoordShard::open(&path)?);
                    } else {
                        debug!(file = other, "ignoring unrecognized archive file");
                    }
                }
            }
        }

        Self::assemble(dir, slots, folding)
    }

    fn assemble(dir: PathBuf, slots: Slots, folding: NormalizeFn) -> Result<Self> {
        let metadata = slots.metadata.ok_or_else(|| {
            ArchiveError::InvalidArchive(format!("{} absent", METADATA_FILENAME))
        })?;

        // Comparisons never mix normalized and raw strings: archives with
        // raw titles get the identity function on both sides.
        let normalize: NormalizeFn = if metadata.normalized_titles {
            folding
        } else {
            identity_normalizer()
        };

        let title_index = slots
            .title_file
            .map(|f| TitleIndex::from_file(f, normalize.clone()));

        let archive = Archive {
            dir,
            title_index,
            search_index: slots.search_index,
            data_shards: slots.data_shards,
            coord_shards: slots.coord_shards,
            math_index: slots.math_index,
            math_data: slots.math_data,
            metadata,
            normalize,
        };

        debug!(
            dir = %archive.dir.display(),
            language = %archive.metadata.language,
            data_shards = archive.data_shard_count(),
            coord_shards = archive.coord_shard_count(),
            ready = archive.is_ready(),
            "archive initialized"
        );
        Ok(archive)
    }
}

fn is_not_found(err: &byteio::ByteIoError) -> bool {
    matches!(err, byteio::ByteIoError::Io(io_err) if io_err.kind() == ErrorKind::NotFound)
}
