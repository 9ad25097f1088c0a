//! Shard planning and per-shard index building.
//!
//! Files are dealt round-robin into N shards. Each shard is written by its own
//! single-threaded writer into a `temp_<i>` directory, so shards share nothing
//! except the progress counter.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
    IndexError,
    cancel::CancelToken,
    discovery::DiscoveredFile,
    extract::DocumentExtractor,
    progress::{Progress, ProgressReporter},
    writer::{LogIndexWriter, WriterOptions},
};

/// Files between progress events during extraction.
const PROGRESS_EVERY: usize = 10;

/// Round-robin partition of the files to index.
#[derive(Debug, Clone, Default)]
pub struct ShardPlan {
    /// Files per shard, in list order.
    shards: Vec<Vec<DiscoveredFile>>,
}

impl ShardPlan {
    /// Deals `files` into `n` shards: file `k` goes to shard `k % n`.
    ///
    /// `n` is clamped to at least 1 and at most the number of files, so no
    /// shard starts empty.
    pub fn round_robin(files: Vec<DiscoveredFile>, n: usize) -> Self {
        let n = n.clamp(1, files.len().max(1));
        let mut shards: Vec<Vec<DiscoveredFile>> = vec![Vec::new(); n];
        for (k, file) in files.into_iter().enumerate() {
            shards[k % n].push(file);
        }
        shards.retain(|shard| !shard.is_empty());
        Self { shards }
    }

    /// Returns the shards.
    pub fn shards(&self) -> &[Vec<DiscoveredFile>] {
        &self.shards
    }

    /// Number of shards.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// True when there is nothing to index.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Total files across all shards.
    pub fn file_count(&self) -> usize {
        self.shards.iter().map(Vec::len).sum()
    }
}

/// Result of building one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardOutcome {
    /// Shard directory.
    pub dir: PathBuf,
    /// Files whose records were written.
    pub files_indexed: usize,
    /// Files skipped after an error.
    pub files_failed: usize,
    /// Documents written.
    pub documents: u64,
}

impl ShardOutcome {
    /// A shard is merged only when at least one file made it in.
    pub fn is_valid(&self) -> bool {
        self.files_indexed > 0
    }
}

/// Shared extraction progress across all shards of one build.
#[derive(Debug)]
pub struct ShardProgress {
    /// Files finished, successfully or not.
    processed: AtomicUsize,
    /// Files to index in this build.
    total: usize,
    /// When extraction started.
    started: Instant,
}

impl ShardProgress {
    /// Starts tracking a build of `total` files.
    pub fn new(total: usize) -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total,
            started: Instant::now(),
        }
    }

    /// Files finished so far.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Counts one finished file and reports at a fixed cadence.
    fn file_done(&self, reporter: &dyn ProgressReporter) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % PROGRESS_EVERY == 0 || processed == self.total {
            reporter.report(&Progress::Indexing {
                processed,
                total: self.total,
                eta: estimate_remaining(self.started.elapsed(), processed, self.total),
            });
        }
    }
}

/// Rolling ETA: average time per finished file times files left.
fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Option<Duration> {
    if processed == 0 || processed >= total {
        return None;
    }
    let remaining = u32::try_from(total - processed).ok()?;
    let done = u32::try_from(processed).ok()?;
    Some(elapsed / done * remaining)
}

/// Everything a shard worker needs besides its files.
#[derive(Clone, Copy)]
pub struct ShardContext<'a> {
    /// Decodes and splits files.
    pub extractor: DocumentExtractor,
    /// Writer settings, with the per-shard heap already applied.
    pub options: &'a WriterOptions,
    /// Shared progress counter.
    pub progress: &'a ShardProgress,
    /// Progress sink.
    pub reporter: &'a dyn ProgressReporter,
    /// Checked before every file.
    pub cancel: &'a CancelToken,
}

/// Builds one shard index in `dir` from `files`.
///
/// A file that cannot be read or decoded is reported and skipped. Failing to
/// open, write or commit the shard is fatal for the build.
pub fn build_shard(
    dir: PathBuf,
    files: &[DiscoveredFile],
    ctx: ShardContext<'_>,
) -> Result<ShardOutcome, IndexError> {
    let mut writer = LogIndexWriter::open(&dir, ctx.options)?;
    let mut outcome = ShardOutcome {
        dir,
        files_indexed: 0,
        files_failed: 0,
        documents: 0,
    };

    for file in files {
        ctx.cancel.check()?;

        match ctx
            .extractor
            .extract_with_date(&file.path, &file.name, file.file_date)
        {
            Ok(records) => {
                for record in &records {
                    writer.add_record(record)?;
                }
                outcome.files_indexed += 1;
                outcome.documents += records.len() as u64;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping unreadable log file");
                ctx.reporter.report(&Progress::FileFailed {
                    path: file.path.clone(),
                    error: e.to_string(),
                });
                outcome.files_failed += 1;
            }
        }
        ctx.progress.file_done(ctx.reporter);
    }

    writer.commit()?;
    writer.finish()?;
    debug!(
        shard = %outcome.dir.display(),
        files = outcome.files_indexed,
        documents = outcome.documents,
        "shard committed"
    );
    Ok(outcome)
}
