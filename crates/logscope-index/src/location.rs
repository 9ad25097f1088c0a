//! Index location resolution and shard directory layout.
//!
//! The index lives at `index.path` when configured, otherwise in `.logscope/index/`
//! next to the most specific `.logscope.toml`, otherwise in the platform data
//! directory. Shard indexes are built in `temp_<i>` subdirectories of the index.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use logscope_config::Config;
use tracing::warn;

/// Directory name for logscope data (sibling to .logscope.toml).
const DATA_DIR: &str = ".logscope";
/// Subdirectory holding the index.
const INDEX_DIR: &str = "index";
/// Prefix of temporary shard directories.
const SHARD_PREFIX: &str = "temp_";

/// Computes the index directory for a configuration.
///
/// Returns `None` only when no location is configured and the platform data
/// directory cannot be determined.
pub fn index_directory(config: &Config) -> Option<PathBuf> {
    if let Some(path) = &config.index.path {
        return Some(path.clone());
    }
    if let Some(root) = &config.config_root {
        return Some(root.join(DATA_DIR).join(INDEX_DIR));
    }
    default_index_directory()
}

/// Returns the index directory used when no configuration names one.
pub fn default_index_directory() -> Option<PathBuf> {
    ProjectDirs::from("", "", "logscope").map(|dirs| dirs.data_dir().join(INDEX_DIR))
}

/// Returns the directory for shard `i` of a build.
pub fn shard_dir(index_dir: &Path, i: usize) -> PathBuf {
    index_dir.join(format!("{SHARD_PREFIX}{i}"))
}

/// Lists shard directories left inside `index_dir`, sorted.
pub fn stale_shard_dirs(index_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(index_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(SHARD_PREFIX))
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

/// Removes directories, logging failures instead of returning them.
///
/// Returns the number of directories removed.
pub fn remove_dirs(dirs: &[PathBuf]) -> usize {
    let mut removed = 0;
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        match fs::remove_dir_all(dir) {
            Ok(()) => removed += 1,
            Err(e) => warn!(dir = %dir.display(), error = %e, "failed to remove shard directory"),
        }
    }
    removed
}
