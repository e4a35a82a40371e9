use super::helpers::{bzip2_block, title_record, ArchiveDir, DEFAULT_METADATA};
use crate::{Archive, ArchiveError};
use anyhow::Result;

/// Builds `math.idx` from `(hash, pos, len)` records, sorted by hash.
fn math_index(records: &[([u8; 16], u32, u32)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * 24);
    for (hash, pos, len) in records {
        out.extend_from_slice(hash);
        out.extend_from_slice(&pos.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
    }
    out
}

fn hash(last: u8) -> [u8; 16] {
    let mut h = [0u8; 16];
    h[15] = last;
    h
}

fn math_archive(index: &[u8], data: &[u8]) -> Result<(ArchiveDir, Archive)> {
    let dir = ArchiveDir::new();
    dir.write("metadata.txt", DEFAULT_METADATA.as_bytes())
        .write("titles.idx", &title_record(0, 0, 0, 4, "a"))
        .write("wikipedia_00.dat", &bzip2_block(b"body"))
        .write("math.idx", index)
        .write("math.dat", data);
    let archive = Archive::open(dir.path())?;
    Ok((dir, archive))
}

// -------------------- Lookup --------------------

#[test]
fn finds_an_image_by_hash() -> Result<()> {
    let index = math_index(&[(hash(1), 0, 5), (hash(2), 5, 3)]);
    let (_dir, archive) = math_archive(&index, b"HELLOBYE")?;

    let bye = archive.load_math_image(&format!("{:032x}", 2))?;
    assert_eq!(bye, b"BYE");

    let hello = archive.load_math_image(&format!("{:032x}", 1))?;
    assert_eq!(hello, b"HELLO");
    Ok(())
}

#[test]
fn image_length_matches_the_index_entry() -> Result<()> {
    let index = math_index(&[(hash(7), 2, 4)]);
    let (_dir, archive) = math_archive(&index, b"0123456789")?;

    let img = archive.load_math_image(&format!("{:032x}", 7))?;
    assert_eq!(img.len(), 4);
    assert_eq!(img, b"2345");
    Ok(())
}

#[test]
fn binary_search_over_many_records() -> Result<()> {
    // 32 records; each image is one byte at pos = its index.
    let mut records = Vec::new();
    let mut data = Vec::new();
    for i in 0..32u8 {
        records.push((hash(i), u32::from(i), 1));
        data.push(b'a' + i % 26);
    }
    let index = math_index(&records);
    let (_dir, archive) = math_archive(&index, &data)?;

    for i in 0..32u8 {
        let hex = format!("{:032x}", i);
        let img = archive.load_math_image(&hex)?;
        assert_eq!(img, vec![b'a' + i % 26], "record {}", i);
    }
    Ok(())
}

// -------------------- Misses --------------------

#[test]
fn absent_hash_is_not_found() -> Result<()> {
    let index = math_index(&[(hash(1), 0, 5), (hash(3), 5, 3)]);
    let (_dir, archive) = math_archive(&index, b"HELLOBYE")?;

    let err = archive
        .load_math_image(&format!("{:032x}", 2))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::NotFound(_)));
    Ok(())
}

#[test]
fn malformed_hash_is_not_found() -> Result<()> {
    let index = math_index(&[(hash(1), 0, 5)]);
    let (_dir, archive) = math_archive(&index, b"HELLO")?;

    for bad in ["xyz", "00", "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"] {
        let err = archive.load_math_image(bad).unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound(_)), "input {:?}", bad);
    }
    Ok(())
}

#[test]
fn archive_without_math_files_is_not_found() -> Result<()> {
    let (dir, _) = ArchiveDir::with_articles(&[("a", "body")]);
    let archive = Archive::open(dir.path())?;
    assert!(!archive.has_math());

    let err = archive
        .load_math_image(&format!("{:032x}", 1))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::NotFound(_)));
    Ok(())
}

#[test]
fn entry_pointing_past_data_is_truncated() -> Result<()> {
    let index = math_index(&[(hash(1), 0, 99)]);
    let (_dir, archive) = math_archive(&index, b"short")?;

    let err = archive
        .load_math_image(&format!("{:032x}", 1))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Truncated(_)));
    Ok(())
}
