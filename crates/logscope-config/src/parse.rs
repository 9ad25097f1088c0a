//! Configuration file parsing.
//!
//! Parses individual `.logscope.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Index settings section.
    pub index: Option<RawIndexSettings>,
    /// Log source settings section.
    pub logs: Option<RawLogSettings>,
    /// Remote synchronisation section.
    pub sync: Option<RawSyncSettings>,
}

/// Raw `[index]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIndexSettings {
    /// Directory holding the index.
    pub path: Option<String>,
    /// Maximum hits returned by a search.
    pub max_results: Option<usize>,
    /// Upper bound on parallel indexing workers.
    pub workers: Option<usize>,
    /// Total writer memory budget in megabytes, split across workers.
    pub writer_memory_mb: Option<usize>,
    /// Optional stemming language applied to log text.
    pub stemmer: Option<String>,
}

/// Raw `[logs]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLogSettings {
    /// Folder scanned for log files.
    pub folder: Option<String>,
    /// Default name filter substring.
    pub filter: Option<String>,
    /// Fallback filter choices offered when the folder cannot be scanned.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub filters: Option<Vec<String>>,
    /// Text encoding label used to decode log files.
    pub encoding: Option<String>,
    /// Windows code page number, overriding `encoding` when set.
    pub codepage: Option<u16>,
    /// Default number of days covered when no date range is given.
    pub days: Option<u32>,
}

/// Raw `[sync]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSyncSettings {
    /// Remote folder copied from.
    pub remote: Option<String>,
    /// Local cache folder copied into.
    pub cache: Option<String>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
