#![allow(clippy::expect_used)]

//! Look up keys in a sorted file.
//!
//! Usage:
//!   cargo run --example lookup -p sorted-file-search -- <file> <key>... [--integer] [--sep ,]
//!
//! Set `RUST_LOG=sorted_file_search=debug` to see probe counts.

use sorted_file_search::{Key, KeyMode, KeyedFileScanner, ScannerConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ScannerConfig::text();
    let mut path = None;
    let mut queries = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--integer" => config = config.with_mode(KeyMode::Integer),
            "--sep" => {
                let sep = args.next().expect("--sep needs a value");
                let sep = sep.chars().next().expect("--sep needs a character");
                config = config.with_separator(sep);
            }
            _ if path.is_none() => path = Some(arg),
            _ => queries.push(arg),
        }
    }

    let path = path.expect("usage: lookup <file> <key>... [--integer] [--sep ,]");
    let scanner = KeyedFileScanner::open(&path, config).expect("failed to open file");

    if !scanner.is_sorted() {
        eprintln!("warning: {path} is not sorted, results are unreliable");
    }

    for query in queries {
        let key = match scanner.mode() {
            KeyMode::Text => Key::Text(query),
            KeyMode::Integer => Key::Integer(query.parse().expect("integer key expected")),
        };

        match scanner.search(key.clone()) {
            Ok(records) => {
                for record in records {
                    println!("{}\t{}", record.key(), record.fields().join("\t"));
                }
            }
            Err(e) if e.is_not_found() => println!("{key}: not found"),
            Err(e) => eprintln!("{key}: {e}"),
        }
    }
}
