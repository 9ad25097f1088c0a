//! Configuration system for logscope.
//!
//! logscope uses TOML configuration files named `.logscope.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.logscope.toml` files found, then loading `~/.logscope.toml` as the global config with
//! lowest precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawIndexSettings, RawLogSettings, RawSyncSettings, parse_config_file,
    parse_config_str,
};
pub use resolve::{format_path_for_display, resolve_path};
pub use templates::Template;

/// Top-level merged configuration for logscope.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.logscope.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Index location and build settings.
    pub index: IndexSettings,
    /// Log source settings.
    pub logs: LogSettings,
    /// Remote synchronisation settings.
    pub sync: SyncSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.logscope.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }
}

/// Index location and build settings.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Explicit index directory. When unset the location is derived from the config root.
    pub path: Option<PathBuf>,
    /// Default cap on search results.
    pub max_results: usize,
    /// Upper bound on parallel shard writers.
    pub workers: usize,
    /// Total writer memory budget in megabytes, shared by all shards.
    pub writer_memory_mb: usize,
    /// Stemming language for log text, if any.
    pub stemmer: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_results: 500,
            workers: 8,
            writer_memory_mb: 400,
            stemmer: None,
        }
    }
}

/// Log source settings.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Default folder scanned by `index`.
    pub folder: Option<PathBuf>,
    /// Default file name filter. Empty matches every log file.
    pub filter: String,
    /// Filter names offered when the log folder cannot be scanned.
    pub filters: Vec<String>,
    /// WHATWG encoding label for log text.
    pub encoding: String,
    /// Windows code page; takes precedence over `encoding`.
    pub codepage: Option<u16>,
    /// Days covered by the default date range.
    pub days: u32,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            folder: None,
            filter: String::new(),
            filters: Vec::new(),
            encoding: String::from("big5"),
            codepage: None,
            days: 7,
        }
    }
}

/// Remote synchronisation settings.
#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    /// Remote folder to copy logs from.
    pub remote: Option<PathBuf>,
    /// Local cache folder logs are copied into.
    pub cache: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_defaults() {
        let index = IndexSettings::default();
        assert!(index.path.is_none());
        assert_eq!(index.max_results, 500);
        assert_eq!(index.workers, 8);
        assert_eq!(index.writer_memory_mb, 400);
        assert!(index.stemmer.is_none());
    }

    #[test]
    fn test_log_settings_defaults() {
        let logs = LogSettings::default();
        assert!(logs.folder.is_none());
        assert!(logs.filter.is_empty());
        assert!(logs.filters.is_empty());
        assert_eq!(logs.encoding, "big5");
        assert!(logs.codepage.is_none());
        assert_eq!(logs.days, 7);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.config_root.is_none());
        assert!(config.sync.remote.is_none());
        assert!(config.sync.cache.is_none());
    }

    #[test]
    fn test_load_from_no_files() {
        let config = Config::load_from_files(&[]).unwrap();
        assert_eq!(config.index.max_results, 500);
        assert!(config.config_root.is_none());
    }
}
