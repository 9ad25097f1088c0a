//! Progress reporting for long-running operations.
//!
//! Builds and syncs emit [`Progress`] events through a [`ProgressReporter`].
//! Reporters are shared by all shard workers, so they take `&self` and must be `Sync`.

use std::{fmt, path::PathBuf, time::Duration};

/// A progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A candidate file was found.
    Found {
        /// File name.
        name: String,
    },
    /// Discovery finished.
    Discovered {
        /// Candidate files.
        files: usize,
    },
    /// Reading the existing index to find files already indexed.
    CheckingExisting,
    /// The existing index could not be read and is rebuilt from scratch.
    IndexReset {
        /// Why it could not be read.
        reason: String,
    },
    /// Periodic update while scanning the existing index.
    ScanningIndex {
        /// Distinct file paths seen so far.
        paths: usize,
    },
    /// Every candidate is already indexed.
    NothingToDo,
    /// Shard writers started.
    Started {
        /// Files to index.
        files: usize,
        /// Parallel shards.
        shards: usize,
    },
    /// Periodic extraction update.
    Indexing {
        /// Files finished so far, across all shards.
        processed: usize,
        /// Files to index in total.
        total: usize,
        /// Estimated time remaining.
        eta: Option<Duration>,
    },
    /// A file was skipped after an error.
    FileFailed {
        /// The file.
        path: PathBuf,
        /// What went wrong.
        error: String,
    },
    /// Appending shard indexes to the main index.
    Merging {
        /// Shards being appended.
        shards: usize,
    },
    /// The build finished.
    Done {
        /// Files indexed.
        files: usize,
        /// Documents added.
        documents: u64,
        /// Wall time.
        elapsed: Duration,
    },
    /// A file is being copied during sync.
    Copying {
        /// 1-based position.
        current: usize,
        /// Files considered.
        total: usize,
        /// File name.
        name: String,
    },
    /// Sync finished.
    Synced {
        /// Files copied.
        copied: usize,
        /// Files already up to date.
        skipped: usize,
        /// Files that failed to copy.
        failed: usize,
    },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { name } => write!(f, "found {name}"),
            Self::Discovered { files } => write!(f, "found {files} candidate files"),
            Self::CheckingExisting => write!(f, "checking existing index"),
            Self::IndexReset { reason } => {
                write!(f, "existing index is unreadable ({reason}), rebuilding from scratch")
            }
            Self::ScanningIndex { paths } => write!(f, "scanned {paths} indexed files"),
            Self::NothingToDo => write!(f, "index is up to date, nothing to do"),
            Self::Started { files, shards } => {
                write!(f, "indexing {files} files with {shards} workers")
            }
            Self::Indexing {
                processed,
                total,
                eta,
            } => {
                write!(f, "indexed {processed}/{total} files")?;
                if let Some(eta) = eta {
                    write!(f, ", about {} left", format_duration(*eta))?;
                }
                Ok(())
            }
            Self::FileFailed { path, error } => {
                write!(f, "skipped {}: {error}", path.display())
            }
            Self::Merging { shards } => write!(f, "merging {shards} shard indexes"),
            Self::Done {
                files,
                documents,
                elapsed,
            } => write!(
                f,
                "indexed {files} files ({documents} lines) in {}",
                format_duration(*elapsed)
            ),
            Self::Copying {
                current,
                total,
                name,
            } => write!(f, "copying {current}/{total} {name}"),
            Self::Synced {
                copied,
                skipped,
                failed,
            } => write!(
                f,
                "copied {copied} files, {skipped} already up to date, {failed} failed"
            ),
        }
    }
}

/// Formats a duration as `m:ss`, or `h:mm:ss` past an hour.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Receives progress events.
pub trait ProgressReporter: Sync {
    /// Handles one event.
    fn report(&self, progress: &Progress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&Progress) + Sync,
{
    fn report(&self, progress: &Progress) {
        self(progress);
    }
}

/// A reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _progress: &Progress) {}
}
