///! # CLI - Archive Reader Shell
///!
///! A REPL-style command-line interface over one Evopedia archive
///! directory. Reads commands from stdin, runs them against the archive,
///! and prints results to stdout. Designed for both interactive use and
///! scripted testing (pipe commands via stdin).
///!
///! ## Commands
///!
///! ```text
///! LOOKUP name               Exact title lookup
///! PREFIX p [n]              Titles with prefix (default limit from env)
///! ARTICLE name              Resolve redirects, decompress, print body
///! NEAR lon lat w h [n]      Titles inside a rectangle, nearest first
///! RANDOM                    A uniformly random title
///! MATH hexhash              Math image lookup (prints byte length)
///! STATS                     Print archive debug info
///! EXIT / QUIT               Leave
///! ```
///!
///! ## Configuration
///!
///! All settings are controlled via environment variables:
///!
///! ```text
///! EVOREADER_DIR           Archive directory      (default: ".")
///! EVOREADER_PREFIX_LIMIT  Default PREFIX limit   (default: 10)
///! RUST_LOG                Log filter, e.g. "archive=debug"
///! ```
///!
///! ## Example
///!
///! ```text
///! $ EVOREADER_DIR=/data/wikipedia_small cargo run -p cli
///! archive ready (language=en, date=2014-06-01, shards=3)
///! > LOOKUP Zurich
///! Zurich  (shard 1, block 183500, offset 4096, 13542 bytes)
///! > PREFIX Zur 3
///! Zurich
///! Zurich Airport
///! Zurichberg
///! (3 titles)
///! > EXIT
///! bye
///! ```

use anyhow::{Context, Result};
use archive::Archive;
use geometry::Rect;
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// One-line summary of a title for the LOOKUP/RANDOM/NEAR output.
fn describe(title: &archive::Title) -> String {
    let place = match &title.location {
        archive::TitleLocation::Article(ptr) => format!(
            "(shard {}, block {}, offset {}, {} bytes)",
            ptr.file_nr, ptr.block_start, ptr.block_offset, ptr.article_length
        ),
        archive::TitleLocation::Redirect { target } => format!("(redirect -> {})", target),
    };
    match title.geolocation {
        Some(p) => format!("{}  {} at ({:.3}, {:.3})", title.name, place, p.lon, p.lat),
        None => format!("{}  {}", title.name, place),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Configuration via environment variables with sensible defaults.
    let dir = env_or("EVOREADER_DIR", ".");
    let prefix_limit: usize = env_or("EVOREADER_PREFIX_LIMIT", "10").parse().unwrap_or(10);

    let archive =
        Archive::open(&dir).with_context(|| format!("failed to open archive in {:?}", dir))?;

    if archive.is_ready() {
        println!(
            "archive ready (language={}, date={}, shards={})",
            archive.language(),
            archive.date(),
            archive.data_shard_count()
        );
    } else {
        println!("archive incomplete: title index or data shards missing");
    }
    println!("Commands: LOOKUP name | PREFIX p [n] | ARTICLE name | NEAR lon lat w h [n]");
    println!("          RANDOM | MATH hexhash | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "LOOKUP" => {
                    let name: String = parts.collect::<Vec<&str>>().join(" ");
                    if name.is_empty() {
                        println!("ERR usage: LOOKUP name");
                    } else {
                        match archive.title_by_name(&name) {
                            Ok(Some(title)) => println!("{}", describe(&title)),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR lookup failed: {}", e),
                        }
                    }
                }
                "PREFIX" => {
                    if let Some(prefix) = parts.next() {
                        let max: usize = parts
                            .next()
                            .and_then(|n| n.parse().ok())
                            .unwrap_or(prefix_limit);
                        match archive.titles_with_prefix(prefix, max) {
                            Ok(hits) => {
                                if hits.is_empty() {
                                    println!("(empty)");
                                } else {
                                    for title in &hits {
                                        println!("{}", title.name);
                                    }
                                    println!("({} titles)", hits.len());
                                }
                            }
                            Err(e) => println!("ERR prefix failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: PREFIX p [n]");
                    }
                }
                "ARTICLE" => {
                    let name: String = parts.collect::<Vec<&str>>().join(" ");
                    if name.is_empty() {
                        println!("ERR usage: ARTICLE name");
                    } else {
                        match archive.title_by_name(&name) {
                            Ok(Some(title)) => match archive.read_article(&title) {
                                Ok(body) => println!("{}", body),
                                Err(e) => println!("ERR read failed: {}", e),
                            },
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR lookup failed: {}", e),
                        }
                    }
                }
                "NEAR" => {
                    let nums: Vec<f64> = parts
                        .by_ref()
                        .take(4)
                        .filter_map(|p| p.parse().ok())
                        .collect();
                    if nums.len() == 4 {
                        let limit = parts.next().and_then(|n| n.parse().ok());
                        let rect = Rect::new(nums[0], nums[1], nums[2], nums[3]);
                        match archive.titles_in_coords(&rect, limit) {
                            Ok(hits) => {
                                if hits.is_empty() {
                                    println!("(empty)");
                                } else {
                                    for title in &hits {
                                        println!("{}", describe(title));
                                    }
                                    println!("({} titles)", hits.len());
                                }
                            }
                            Err(e) => println!("ERR near failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: NEAR lon lat w h [n]");
                    }
                }
                "RANDOM" => match archive.random_title() {
                    Ok(Some(title)) => println!("{}", describe(&title)),
                    Ok(None) => println!("(empty index)"),
                    Err(e) => println!("ERR random failed: {}", e),
                },
                "MATH" => {
                    if let Some(hash) = parts.next() {
                        match archive.load_math_image(hash) {
                            Ok(bytes) => println!("{} bytes", bytes.len()),
                            Err(e) => println!("ERR math failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: MATH hexhash");
                    }
                }
                "STATS" => {
                    println!("{:?}", archive);
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
