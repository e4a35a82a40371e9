use std::path::Path;

/// Encodes one title record (header + name + LF).
pub fn encode_record(
    flags: u16,
    file_nr: u8,
    block_start: u32,
    block_offset: u32,
    article_length: u32,
    name: &str,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(crate::HEADER_LEN + name.len() + 1);
    out.extend_from_slice(&flags.to_le_bytes());
    out.push(file_nr);
    out.extend_from_slice(&block_start.to_le_bytes());
    out.extend_from_slice(&block_offset.to_le_bytes());
    out.extend_from_slice(&article_length.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.push(b'\n');
    out
}

/// Encodes an article record with placeholder pointer fields.
pub fn plain_record(name: &str) -> Vec<u8> {
    encode_record(0, 0, 0, 0, 7, name)
}

/// Writes a title file from pre-sorted names and returns it, along with
/// the starting offset of each record.
pub fn write_title_file(path: &Path, names: &[&str]) -> std::io::Result<Vec<u64>> {
    let mut bytes = Vec::new();
    let mut offsets = Vec::with_capacity(names.len());
    for name in names {
        offsets.push(bytes.len() as u64);
        bytes.extend_from_slice(&plain_record(name));
    }
    std::fs::write(path, bytes)?;
    Ok(offsets)
}
