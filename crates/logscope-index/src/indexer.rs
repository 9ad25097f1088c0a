//! Incremental parallel index builds.
//!
//! The [`Indexer`] runs one build pass:
//! 1. Remove shard directories left by an interrupted build
//! 2. Discover candidate files in the folder
//! 3. Read the existing index to find files already indexed, starting over if
//!    it cannot be read
//! 4. Deal the remaining files round-robin into shards
//! 5. Build every shard in parallel into `temp_<i>`
//! 6. Append the valid shards to the main index, then delete the older copies of
//!    rescanned live files
//! 7. Remove the shard directories

use std::{
    collections::HashSet,
    fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use encoding_rs::Encoding;
use logscope_config::{Config, IndexSettings};
use rayon::{ThreadPoolBuilder, prelude::*};
use tantivy::SegmentId;
use tracing::{debug, info, warn};

use crate::{
    IndexError,
    analyzer::parse_language,
    cancel::CancelToken,
    date::DateRange,
    discovery::{DiscoveredFile, discover_files},
    encoding::resolve_encoding,
    extract::DocumentExtractor,
    location::{index_directory, remove_dirs, shard_dir, stale_shard_dirs},
    merge::append_shards,
    progress::{Progress, ProgressReporter},
    shard::{ShardContext, ShardOutcome, ShardPlan, ShardProgress, build_shard},
    status::index_exists,
    tracker::{IndexScan, scan_index},
    writer::{LogIndexWriter, MIN_HEAP_PER_THREAD, WriterOptions},
};

/// Bytes per configured megabyte of writer memory.
const MEGABYTE: usize = 1 << 20;

/// What to index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Folder holding the log files.
    pub folder: PathBuf,
    /// File name filter; empty matches every log file.
    pub filter: String,
    /// File dates to include.
    pub range: DateRange,
}

/// Statistics from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Files matching the folder, filter and date range.
    pub candidates: usize,
    /// Files already indexed and left alone.
    pub files_skipped: usize,
    /// Live files indexed before and indexed again.
    pub live_rescanned: usize,
    /// Files whose lines were written.
    pub files_indexed: usize,
    /// Files skipped after an error.
    pub files_failed: usize,
    /// Documents (log lines) added.
    pub documents: u64,
    /// Shards built.
    pub shards: usize,
    /// Wall time of the build.
    pub elapsed: Duration,
}

impl IndexStats {
    /// Returns true if the build found nothing new to index.
    pub fn is_up_to_date(&self) -> bool {
        self.shards == 0
    }
}

/// Files chosen for a build.
#[derive(Debug, Default)]
struct Selection {
    /// Files to extract.
    to_index: Vec<DiscoveredFile>,
    /// Paths of live files whose existing documents must go first.
    replace: Vec<String>,
    /// Already indexed files that are skipped.
    skipped: usize,
}

/// Builds the log index incrementally, one shard per worker.
#[derive(Debug, Clone)]
pub struct Indexer {
    /// Main index directory.
    index_dir: PathBuf,
    /// Upper bound on parallel shards.
    workers: usize,
    /// Total writer heap shared by all shards, in bytes.
    memory_budget: usize,
    /// Stemming language for the log analyzer.
    stemmer: Option<String>,
    /// Decodes log files.
    extractor: DocumentExtractor,
}

impl Indexer {
    /// Creates an indexer from the loaded configuration.
    ///
    /// Fails when no index location can be determined, the encoding is unknown,
    /// or the stemmer language is unsupported.
    pub fn new(config: &Config) -> Result<Self, IndexError> {
        let index_dir = index_directory(config).ok_or_else(|| {
            IndexError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "cannot determine an index location",
            ))
        })?;
        let encoding = resolve_encoding(&config.logs.encoding, config.logs.codepage)?;
        Self::with_settings(index_dir, &config.index, encoding)
    }

    /// Creates an indexer for `index_dir` with explicit settings.
    pub fn with_settings(
        index_dir: PathBuf,
        settings: &IndexSettings,
        encoding: &'static Encoding,
    ) -> Result<Self, IndexError> {
        if let Some(stemmer) = &settings.stemmer {
            parse_language(stemmer)?;
        }
        Ok(Self {
            index_dir,
            workers: settings.workers.max(1),
            memory_budget: settings.writer_memory_mb.saturating_mul(MEGABYTE),
            stemmer: settings.stemmer.clone(),
            extractor: DocumentExtractor::new(encoding),
        })
    }

    /// Returns the path to the index directory.
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Returns the encoding used to read log files.
    pub fn encoding(&self) -> &'static Encoding {
        self.extractor.encoding()
    }

    /// Indexes every file of `request` not yet in the index.
    ///
    /// Files already indexed are skipped, except live files, which are indexed
    /// again and replace their earlier lines. Shard directories are removed
    /// whether the build succeeds or not.
    pub fn build(
        &self,
        request: &BuildRequest,
        reporter: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<IndexStats, IndexError> {
        let started = Instant::now();
        if !request.folder.is_dir() {
            return Err(IndexError::SourceNotFound {
                path: request.folder.clone(),
            });
        }

        let stale = stale_shard_dirs(&self.index_dir);
        if !stale.is_empty() {
            warn!(count = stale.len(), "removing shard directories from an earlier build");
            remove_dirs(&stale);
        }

        let candidates = discover_files(&request.folder, &request.filter, request.range);
        for file in &candidates {
            reporter.report(&Progress::Found {
                name: file.name.clone(),
            });
        }
        reporter.report(&Progress::Discovered {
            files: candidates.len(),
        });
        cancel.check()?;

        reporter.report(&Progress::CheckingExisting);
        let indexed = match scan_index(&self.index_dir, reporter) {
            IndexScan::Unreadable(reason) => {
                warn!(index = %self.index_dir.display(), "rebuilding unreadable index");
                reporter.report(&Progress::IndexReset { reason });
                fs::remove_dir_all(&self.index_dir)?;
                HashSet::new()
            }
            scan => scan.into_paths(),
        };
        let mut stats = IndexStats {
            candidates: candidates.len(),
            ..IndexStats::default()
        };
        let selection = select_files(candidates, &indexed);
        stats.files_skipped = selection.skipped;
        stats.live_rescanned = selection.replace.len();

        if selection.to_index.is_empty() {
            info!(candidates = stats.candidates, "index is up to date");
            reporter.report(&Progress::NothingToDo);
            stats.elapsed = started.elapsed();
            return Ok(stats);
        }
        cancel.check()?;

        let shards = self.shard_count(selection.to_index.len());
        let plan = ShardPlan::round_robin(selection.to_index, shards);
        let dirs: Vec<PathBuf> = (0..plan.len())
            .map(|i| shard_dir(&self.index_dir, i))
            .collect();
        info!(
            files = plan.file_count(),
            shards = plan.len(),
            index = %self.index_dir.display(),
            "building index"
        );
        reporter.report(&Progress::Started {
            files: plan.file_count(),
            shards: plan.len(),
        });

        let result = self.build_shards(&plan, &dirs, &selection.replace, reporter, cancel);
        remove_dirs(&dirs);
        let outcomes = result?;

        stats.shards = plan.len();
        for outcome in &outcomes {
            stats.files_indexed += outcome.files_indexed;
            stats.files_failed += outcome.files_failed;
            stats.documents += outcome.documents;
        }
        stats.elapsed = started.elapsed();
        info!(
            files = stats.files_indexed,
            failed = stats.files_failed,
            documents = stats.documents,
            elapsed_ms = stats.elapsed.as_millis(),
            "index build finished"
        );
        reporter.report(&Progress::Done {
            files: stats.files_indexed,
            documents: stats.documents,
            elapsed: stats.elapsed,
        });
        Ok(stats)
    }

    /// Builds all shards, then appends the valid ones to the main index.
    fn build_shards(
        &self,
        plan: &ShardPlan,
        dirs: &[PathBuf],
        replace: &[String],
        reporter: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<Vec<ShardOutcome>, IndexError> {
        // Holding the main writer keeps a second build out until the merge.
        let main = LogIndexWriter::open(&self.index_dir, &self.main_options())?;

        let options = WriterOptions {
            heap_bytes: self.memory_budget / plan.len().max(1),
            threads: 1,
            stemmer: self.stemmer.clone(),
        };
        let progress = ShardProgress::new(plan.file_count());
        let ctx = ShardContext {
            extractor: self.extractor,
            options: &options,
            progress: &progress,
            reporter,
            cancel,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(plan.len())
            .thread_name(|i| format!("logscope-shard-{i}"))
            .build()
            .map_err(|e| IndexError::Io(io::Error::other(e.to_string())))?;

        let outcomes: Vec<ShardOutcome> = pool.install(|| {
            plan.shards()
                .par_iter()
                .zip(dirs.par_iter())
                .map(|(files, dir)| build_shard(dir.clone(), files, ctx))
                .collect::<Result<_, _>>()
        })?;
        cancel.check()?;
        main.finish()?;

        let valid: Vec<PathBuf> = outcomes
            .iter()
            .filter(|outcome| outcome.is_valid())
            .map(|outcome| outcome.dir.clone())
            .collect();
        debug!(
            processed = progress.processed(),
            valid = valid.len(),
            empty = outcomes.len() - valid.len(),
            "shards finished"
        );
        reporter.report(&Progress::Merging {
            shards: valid.len(),
        });
        let appended = append_shards(&self.index_dir, &valid)?;
        self.drop_replaced(replace, &appended)?;
        Ok(outcomes)
    }

    /// Deletes the lines of rescanned live files everywhere but the `appended` segments.
    fn drop_replaced(
        &self,
        replace: &[String],
        appended: &[SegmentId],
    ) -> Result<(), IndexError> {
        if replace.is_empty() {
            return Ok(());
        }
        let mut main = LogIndexWriter::open(&self.index_dir, &self.main_options())?;
        for path in replace {
            main.delete_file(path, appended)?;
        }
        main.commit()?;
        main.finish()?;
        debug!(files = replace.len(), "older copies of live files deleted");
        Ok(())
    }

    /// Writer options for the main index, which only takes deletes.
    fn main_options(&self) -> WriterOptions {
        WriterOptions {
            heap_bytes: MIN_HEAP_PER_THREAD,
            threads: 1,
            stemmer: self.stemmer.clone(),
        }
    }

    /// Number of shards for `files` files.
    ///
    /// Bounded by the configured workers, available cores, the file count and
    /// how many minimum-sized writer heaps fit in the memory budget.
    fn shard_count(&self, files: usize) -> usize {
        let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let by_memory = self.memory_budget / MIN_HEAP_PER_THREAD;
        self.workers.min(cores).min(files).min(by_memory).max(1)
    }

    /// Deletes every document from the index.
    pub fn clear(&self) -> Result<(), IndexError> {
        clear_index(&self.index_dir)
    }
}

/// Splits candidates into files to index and files to skip.
fn select_files(candidates: Vec<DiscoveredFile>, indexed: &HashSet<String>) -> Selection {
    let mut selection = Selection::default();
    for file in candidates {
        let key = file.path.to_string_lossy();
        if indexed.contains(&*key) {
            if !file.live {
                selection.skipped += 1;
                continue;
            }
            selection.replace.push(key.into_owned());
        }
        selection.to_index.push(file);
    }
    selection
}

/// Deletes every document from the index at `index_dir` and removes leftover
/// shard directories. A missing index is left alone.
pub fn clear_index(index_dir: &Path) -> Result<(), IndexError> {
    remove_dirs(&stale_shard_dirs(index_dir));
    if !index_exists(index_dir) {
        return Ok(());
    }
    let mut writer = LogIndexWriter::open(index_dir, &WriterOptions::default())?;
    writer.delete_all()?;
    writer.commit()?;
    writer.finish()?;
    info!(index = %index_dir.display(), "index cleared");
    Ok(())
}
