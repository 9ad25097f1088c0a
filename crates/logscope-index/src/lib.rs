//! Incremental, parallel log indexing and search for logscope.
//!
//! This crate owns the log index. It handles:
//! - Date parsing for file names and log lines
//! - Discovering log files by name filter and date range
//! - Finding which files an existing index already covers
//! - Decoding legacy-encoded log files into per-line records
//! - Building shard indexes in parallel and appending them to the main index
//! - Keyword and date range search with a cached, auto-refreshing reader
//! - Copying remote log folders into a local cache
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use logscope_config::Config;
//! use logscope_index::{
//!     BuildRequest, CancelToken, DateRange, Indexer, SearchEngine, SearchOptions, SilentReporter,
//! };
//!
//! let config = Config::default();
//! let indexer = Indexer::new(&config).unwrap();
//! let request = BuildRequest {
//!     folder: PathBuf::from("/var/log/app"),
//!     filter: String::from("app"),
//!     range: DateRange::last_days(7),
//! };
//! indexer.build(&request, &SilentReporter, &CancelToken::new()).unwrap();
//!
//! let engine = SearchEngine::new(indexer.index_dir().to_path_buf(), None, 500);
//! let found = engine.search("timeout", &SearchOptions::default()).unwrap();
//! println!("showing {} of {}", found.results.len(), found.total_hits);
//! ```

#![warn(missing_docs)]

mod analyzer;
mod cancel;
mod date;
mod discovery;
mod encoding;
mod error;
mod extract;
mod indexer;
mod location;
mod merge;
mod progress;
mod record;
mod schema;
mod search;
mod shard;
mod status;
mod sync;
mod tokenizer;
mod tracker;
mod writer;

pub use cancel::CancelToken;
pub use date::{
    DateRange, MAX_FILE_DATE, MIN_FILE_DATE, date_from_timestamp, extract_timestamp,
    format_date, parse_date_from_file_name, parse_file_date, to_file_date, today,
};
pub use discovery::{DiscoveredFile, discover_files, filter_names};
pub use encoding::{encoding_for_codepage, resolve_encoding};
pub use error::IndexError;
pub use extract::DocumentExtractor;
pub use indexer::{BuildRequest, IndexStats, Indexer, clear_index};
pub use location::{default_index_directory, index_directory, stale_shard_dirs};
pub use progress::{Progress, ProgressReporter, SilentReporter, format_duration};
pub use record::IndexRecord;
pub use search::{SearchEngine, SearchOptions, SearchResult, SearchResults, SortOrder};
pub use shard::ShardPlan;
pub use status::{IndexStatus, IndexSummary, index_exists, summarize_index};
pub use sync::{SyncSummary, sync_remote_files};
pub use tracker::collect_indexed_paths;
pub use writer::{LogIndexWriter, WriterOptions};
