use archive::Archive;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

const N_TITLES: usize = 10_000;

fn title_record(block_offset: u32, article_length: u32, name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.push(0u8);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&block_offset.to_le_bytes());
    out.extend_from_slice(&article_length.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.push(b'\n');
    out
}

/// Writes an archive whose title file holds `N_TITLES` sorted names.
fn build_archive(dir: &Path) {
    std::fs::write(
        dir.join("metadata.txt"),
        "language = en\ndate = 2014-06-01\nnormalized_titles = 0\n",
    )
    .unwrap();

    let mut titles = Vec::new();
    for i in 0..N_TITLES {
        titles.extend_from_slice(&title_record(0, 4, &format!("article {:06}", i)));
    }
    std::fs::write(dir.join("titles.idx"), &titles).unwrap();

    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"body").unwrap();
    std::fs::write(dir.join("wikipedia_00.dat"), encoder.finish().unwrap()).unwrap();
}

fn exact_lookup_benchmark(c: &mut Criterion) {
    c.bench_function("title_by_name_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                build_archive(dir.path());
                let archive = Archive::open(dir.path()).unwrap();
                (dir, archive)
            },
            |(_dir, archive)| {
                for i in (0..N_TITLES).step_by(97) {
                    let name = format!("article {:06}", i);
                    let hit = archive.title_by_name(&name).unwrap();
                    assert!(hit.is_some());
                }
            },
            BatchSize::LargeInput,
        );
    });
}

fn prefix_search_benchmark(c: &mut Criterion) {
    c.bench_function("titles_with_prefix_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                build_archive(dir.path());
                let archive = Archive::open(dir.path()).unwrap();
                (dir, archive)
            },
            |(_dir, archive)| {
                let hits = archive.titles_with_prefix("article 0042", 100).unwrap();
                assert!(!hits.is_empty());
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, exact_lookup_benchmark, prefix_search_benchmark);
criterion_main!(benches);
