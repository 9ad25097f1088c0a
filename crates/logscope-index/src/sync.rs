//! Copies remote log files into a local cache folder.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::{debug, info, warn};

use crate::{
    IndexError,
    cancel::CancelToken,
    date::DateRange,
    discovery::{DiscoveredFile, discover_files},
    progress::{Progress, ProgressReporter},
};

/// What a sync pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Local copies that are current after the pass, copied or not.
    pub paths: Vec<PathBuf>,
    /// Files copied.
    pub copied: usize,
    /// Files whose local copy already matched.
    pub skipped: usize,
    /// Files that failed to copy.
    pub failed: usize,
}

/// Copies files from `remote` matching `filter` and `range` into `local`.
///
/// A file is copied only when the local copy is missing or differs in size or
/// modification time (to the second). Copies keep the remote modification time.
/// Failures on single files are logged and skipped.
pub fn sync_remote_files(
    remote: &Path,
    local: &Path,
    filter: &str,
    range: DateRange,
    reporter: &dyn ProgressReporter,
    cancel: &CancelToken,
) -> Result<SyncSummary, IndexError> {
    if !remote.is_dir() {
        return Err(IndexError::SourceNotFound {
            path: remote.to_path_buf(),
        });
    }
    fs::create_dir_all(local)?;

    let files = discover_files(remote, filter, range);
    let total = files.len();
    let mut summary = SyncSummary::default();

    for (i, file) in files.iter().enumerate() {
        cancel.check()?;
        let target = local.join(&file.name);

        if is_current(&target, file) {
            debug!(file = %file.name, "local copy is current");
            summary.skipped += 1;
            summary.paths.push(target);
            continue;
        }

        reporter.report(&Progress::Copying {
            current: i + 1,
            total,
            name: file.name.clone(),
        });
        match copy_file(file, &target) {
            Ok(()) => {
                summary.copied += 1;
                summary.paths.push(target);
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "failed to copy log file");
                reporter.report(&Progress::FileFailed {
                    path: file.path.clone(),
                    error: e.to_string(),
                });
                summary.failed += 1;
            }
        }
    }

    info!(
        copied = summary.copied,
        skipped = summary.skipped,
        failed = summary.failed,
        "sync finished"
    );
    reporter.report(&Progress::Synced {
        copied: summary.copied,
        skipped: summary.skipped,
        failed: summary.failed,
    });
    Ok(summary)
}

/// True when `target` exists with the remote file's size and mtime.
fn is_current(target: &Path, file: &DiscoveredFile) -> bool {
    let Ok(metadata) = fs::metadata(target) else {
        return false;
    };
    let Ok(mtime) = metadata.modified() else {
        return false;
    };
    metadata.len() == file.size && unix_seconds(mtime) == unix_seconds(file.mtime)
}

/// Copies the file and stamps the copy with the source modification time.
fn copy_file(file: &DiscoveredFile, target: &Path) -> Result<(), IndexError> {
    fs::copy(&file.path, target)?;
    File::options()
        .write(true)
        .open(target)?
        .set_modified(file.mtime)?;
    Ok(())
}

/// Whole seconds since the epoch; earlier times map to 0.
fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
