//! Log file discovery.
//!
//! Lists a single folder (no recursion), keeps files whose names match `*filter*`
//! and contain a `.txt` or `.log` marker, and keeps those whose file date falls
//! inside the requested range.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
    time::SystemTime,
};

use chrono::NaiveDate;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::date::{DateRange, date_from_system_time, is_live_file, parse_date_from_file_name};

/// Strips the log marker and date suffix to leave a filter-friendly base name.
static BASE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?<name>.*?)(?:\.log|\.txt)?(?:\.?\d{8})?$")
        .expect("base name pattern is valid")
});

/// A log file selected for indexing or syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// File name without directory.
    pub name: String,
    /// Date attributed to the file, from its name or modification time.
    pub file_date: NaiveDate,
    /// Whether this is today's file still being written.
    pub live: bool,
    /// Size in bytes at discovery time.
    pub size: u64,
    /// Modification time at discovery time.
    pub mtime: SystemTime,
}

/// Finds log files in `folder` matching `filter` whose date lies in `range`.
///
/// Listing failures are logged and produce an empty result. Results are sorted
/// by path and contain no duplicates.
pub fn discover_files(folder: &Path, filter: &str, range: DateRange) -> Vec<DiscoveredFile> {
    let Some(matcher) = name_matcher(filter) else {
        return Vec::new();
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                warn!(folder = %folder.display(), error = %e, "cannot list log folder");
                return Vec::new();
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !matcher.is_match(name) || !has_log_marker(name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "cannot stat log file");
                continue;
            }
        };
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let file_date =
            parse_date_from_file_name(name).unwrap_or_else(|| date_from_system_time(mtime));

        if !range.contains(file_date) {
            continue;
        }

        files.push(DiscoveredFile {
            path: entry.path().to_path_buf(),
            name: name.to_string(),
            file_date,
            live: is_live_file(name),
            size: metadata.len(),
            mtime,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    files
}

/// Derives distinct filter names from the files in `folder`.
///
/// `app.log20250101`, `app.log` and `app.txt.20250102` all yield `app`. Names are
/// deduplicated case-insensitively and sorted. When the folder is unreadable or
/// holds no files, `fallback` is returned instead.
pub fn filter_names(folder: &Path, fallback: &[String]) -> Vec<String> {
    let mut names: BTreeMap<String, String> = BTreeMap::new();

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(folder = %folder.display(), error = %e, "cannot scan folder for filters");
                break;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(name) = base_name(file_name) {
            names.entry(name.to_lowercase()).or_insert_with(|| name.to_string());
        }
    }

    if names.is_empty() {
        return fallback.to_vec();
    }
    names.into_values().collect()
}

/// Returns the base name of a log file, or `None` if nothing is left.
fn base_name(file_name: &str) -> Option<&str> {
    let name = BASE_NAME
        .captures(file_name)
        .and_then(|caps| caps.name("name"))
        .map_or(file_name, |m| m.as_str());
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Returns true if the name contains `.txt` or `.log` anywhere, tolerating date suffixes.
fn has_log_marker(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains(".txt") || lower.contains(".log")
}

/// Builds the case-insensitive `*filter*` matcher.
fn name_matcher(filter: &str) -> Option<GlobMatcher> {
    let filter = filter.trim();
    let pattern = if filter.is_empty() {
        String::from("*")
    } else {
        format!("*{}*", globset::escape(filter))
    };
    match GlobBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!(filter, error = %e, "invalid name filter");
            None
        }
    }
}
