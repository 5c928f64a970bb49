//! Binary search over key-sorted text files too large to load into memory.
//!
//! Each line of the file starts with a key followed by a separator and any
//! number of further fields:
//!
//! ```text
//! aa<TAB>first
//! aaA<TAB>second
//! bA<TAB>fourth_1
//! bA<TAB>fourth_2
//! ```
//!
//! Given a file sorted by that key, a lookup bisects byte offsets, snapping
//! each probe to a line boundary, and then returns every line of the matching
//! run. Only O(log n) lines are read to find the run, instead of scanning the
//! file.
//!
//! Sorting is the caller's job and must use the same order as the key mode:
//!
//! - [`KeyMode::Text`] compares bytes: `LC_ALL=C sort -t$'\t' -k1,1`
//! - [`KeyMode::Integer`] compares signed integers: `sort -t$'\t' -k1,1 -n`
//!
//! [`KeyedFileScanner::is_sorted`] verifies a file once before it is trusted.
//!
//! # Example
//!
//! ```
//! use sorted_file_search::{Key, KeyedFileScanner, Record, ScannerConfig};
//!
//! let data = b"1,one\n3,three\n4,four\n1000000,million\n".to_vec();
//! let config = ScannerConfig::integer().with_separator(',');
//! let scanner = KeyedFileScanner::from_source(data, config)?;
//!
//! assert!(scanner.is_sorted());
//! assert_eq!(scanner.search(4)?, vec![Record::new(Key::Integer(4), ["four"])]);
//! assert!(scanner.search(2).unwrap_err().is_not_found());
//! # Ok::<(), sorted_file_search::SearchError>(())
//! ```
//!
//! With the key type known at compile time, [`SortedFile`] avoids the runtime
//! mode check entirely:
//!
//! ```no_run
//! use sorted_file_search::SortedFile;
//!
//! let file = SortedFile::<String>::open("text_test.sorted", '\t')?;
//! let records = file.search(&"bA".to_string())?;
//! # Ok::<(), sorted_file_search::SearchError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod key;
mod lines;
pub mod record;
mod scanner;
mod search;
mod sorted_file;
pub mod sortedness;
pub mod source;

pub use config::{DEFAULT_SEPARATOR, ScannerConfig, SourceBackend};
pub use error::{Result, SearchError};
pub use key::{Key, KeyMode, LineKey};
pub use record::Record;
pub use scanner::KeyedFileScanner;
pub use sorted_file::SortedFile;
pub use sortedness::SortViolation;
pub use source::{FileSource, ReadAt};
