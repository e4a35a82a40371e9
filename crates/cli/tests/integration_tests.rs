/// End-to-end tests for the archive reader CLI.
/// Builds a small archive on disk, drives the shell over piped stdin, and
/// checks the printed output: lookups, prefixes, articles, redirects,
/// geographic search, math images.
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::tempdir;

/// Encodes one title record (header + name + LF).
fn title_record(
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

/// Builds a complete archive: four articles in one shard, a redirect, one
/// coordinate shard, and a two-image math index.
fn build_fixture_archive(dir: &Path) {
    std::fs::write(
        dir.join("metadata.txt"),
        "language = en\ndate = 2014-06-01\nnormalized_titles = 0\n",
    )
    .unwrap();

    // One bzip2 block holding every body back to back.
    let bodies: [(&str, &str); 4] = [
        ("car", "An article about cars."),
        ("card", "An article about cards."),
        ("cat", "An article about cats."),
        ("paris", "An article about Paris."),
    ];
    let mut block = Vec::new();
    let mut titles = Vec::new();
    let mut offsets = Vec::new();
    for (name, body) in bodies {
        titles.push((name, block.len() as u32, body.len() as u32));
        block.extend_from_slice(body.as_bytes());
    }
    let mut title_bytes = Vec::new();
    for (name, block_offset, len) in titles {
        offsets.push((name, title_bytes.len() as u32));
        title_bytes.extend_from_slice(&title_record(0, 0, block_offset, len, name));
    }
    // "vehicle" redirects to "car" (record offset 0 in the title file).
    title_bytes.extend_from_slice(&title_record(0xFF, 0, 0, 0, "vehicle"));

    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&block).unwrap();
    std::fs::write(dir.join("wikipedia_00.dat"), encoder.finish().unwrap()).unwrap();

    // Coordinate shard: a single leaf placing "paris" at (2.3E, 48.8N).
    let paris_offset = offsets
        .iter()
        .find(|(name, _)| *name == "paris")
        .map(|(_, off)| *off)
        .unwrap();
    let mut coords = Vec::new();
    coords.extend_from_slice(&1u16.to_le_bytes());
    coords.extend_from_slice(&48.8f32.to_le_bytes());
    coords.extend_from_slice(&2.3f32.to_le_bytes());
    coords.extend_from_slice(&paris_offset.to_le_bytes());
    std::fs::write(dir.join("coordinates_01.idx"), &coords).unwrap();

    std::fs::write(dir.join("titles.idx"), &title_bytes).unwrap();

    // Math index: two images in "HELLOBYE".
    let mut math_idx = Vec::new();
    for (last, pos, len) in [(1u8, 0u32, 5u32), (2, 5, 3)] {
        let mut hash = [0u8; 16];
        hash[15] = last;
        math_idx.extend_from_slice(&hash);
        math_idx.extend_from_slice(&pos.to_le_bytes());
        math_idx.extend_from_slice(&len.to_le_bytes());
    }
    std::fs::write(dir.join("math.idx"), &math_idx).unwrap();
    std::fs::write(dir.join("math.dat"), b"HELLOBYE").unwrap();
}

/// Spawns the CLI against `archive_dir`, pipes `commands`, returns stdout.
fn run_cli(archive_dir: &Path, commands: &str) -> String {
    use std::process::{Command, Stdio};

    let mut child = Command::new("cargo")
        .args(["run", "-p", "cli", "--"])
        .env("EVOREADER_DIR", archive_dir.to_str().unwrap())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn CLI");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        stdin
            .write_all(commands.as_bytes())
            .expect("failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("failed to write EXIT");
    }

    let output = child.wait_with_output().expect("failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn startup_banner_reports_a_ready_archive() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "");
    assert!(output.contains("archive ready"));
    assert!(output.contains("language=en"));
    assert!(output.contains("bye"));
}

#[test]
fn lookup_present_and_absent() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "LOOKUP cat\nLOOKUP zebra\n");
    assert!(output.contains("cat"));
    assert!(output.contains("(nil)"));
}

#[test]
fn prefix_lists_matches_in_order() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "PREFIX car\n");
    let car_pos = output.find("car").unwrap();
    let card_pos = output.find("card").unwrap();
    assert!(car_pos <= card_pos);
    assert!(output.contains("(2 titles)"));
    assert!(!output.contains("cat\n"));
}

#[test]
fn article_prints_the_decompressed_body() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "ARTICLE cat\n");
    assert!(output.contains("An article about cats."));
}

#[test]
fn article_follows_redirects() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "ARTICLE vehicle\n");
    assert!(output.contains("An article about cars."));
}

#[test]
fn near_finds_titles_by_rectangle() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "NEAR 0 45 10 10\nNEAR -80 40 2 2\n");
    assert!(output.contains("paris"));
    assert!(output.contains("(1 titles)"));
    assert!(output.contains("(empty)"));
}

#[test]
fn math_reports_image_length() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let commands = format!("MATH {:032x}\nMATH {:032x}\n", 2, 9);
    let output = run_cli(dir.path(), &commands);
    assert!(output.contains("3 bytes"));
    assert!(output.contains("ERR math failed"));
}

#[test]
fn random_yields_some_known_title() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "RANDOM\n");
    let known = ["car", "card", "cat", "paris", "vehicle"];
    assert!(known.iter().any(|name| output.contains(name)));
}

#[test]
fn stats_prints_archive_debug_info() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "STATS\n");
    assert!(output.contains("Archive"));
    assert!(output.contains("ready: true"));
}

#[test]
fn unknown_commands_are_reported() {
    let dir = tempdir().unwrap();
    build_fixture_archive(dir.path());

    let output = run_cli(dir.path(), "FROBNICATE\n");
    assert!(output.contains("unknown command: FROBNICATE"));
}
