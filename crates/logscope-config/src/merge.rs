//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::path::{Path, PathBuf};

use crate::{
    Config, ConfigError, IndexSettings, LogSettings, SyncSettings,
    parse::{RawConfig, RawIndexSettings, RawLogSettings, RawSyncSettings},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory relative paths in this file resolve against.
    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Every scalar takes the first defined value.
/// Paths are resolved relative to the file that defined them.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let index = merge_index_settings(configs)?;
    let logs = merge_log_settings(configs)?;
    let sync = merge_sync_settings(configs)?;
    let config_root = configs.first().map(|c| c.base_dir().to_path_buf());

    Ok(Config {
        index,
        logs,
        sync,
        config_root,
    })
}

/// Merges `[index]` sections.
fn merge_index_settings(configs: &[ParsedConfig]) -> Result<IndexSettings, ConfigError> {
    let mut result = IndexSettings::default();

    // Lowest precedence first so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(ref index) = parsed.config.index {
            apply_raw_index(&mut result, index, parsed.base_dir())?;
        }
    }

    require_nonzero("index.max_results", result.max_results)?;
    require_nonzero("index.workers", result.workers)?;
    require_nonzero("index.writer_memory_mb", result.writer_memory_mb)?;
    Ok(result)
}

/// Applies a raw `[index]` section on top of `result`.
fn apply_raw_index(
    result: &mut IndexSettings,
    raw: &RawIndexSettings,
    base: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.path {
        result.path = Some(resolve_path(v, base)?);
    }
    if let Some(v) = raw.max_results {
        result.max_results = v;
    }
    if let Some(v) = raw.workers {
        result.workers = v;
    }
    if let Some(v) = raw.writer_memory_mb {
        result.writer_memory_mb = v;
    }
    if let Some(ref v) = raw.stemmer {
        result.stemmer = if v.is_empty() { None } else { Some(v.clone()) };
    }
    Ok(())
}

/// Merges `[logs]` sections.
fn merge_log_settings(configs: &[ParsedConfig]) -> Result<LogSettings, ConfigError> {
    let mut result = LogSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref logs) = parsed.config.logs {
            apply_raw_logs(&mut result, logs, parsed.base_dir())?;
        }
    }

    Ok(result)
}

/// Applies a raw `[logs]` section on top of `result`.
fn apply_raw_logs(
    result: &mut LogSettings,
    raw: &RawLogSettings,
    base: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.folder {
        result.folder = Some(resolve_path(v, base)?);
    }
    if let Some(ref v) = raw.filter {
        result.filter = v.clone();
    }
    if let Some(ref v) = raw.filters {
        result.filters = v.clone();
    }
    if let Some(ref v) = raw.encoding {
        result.encoding = v.clone();
    }
    if let Some(v) = raw.codepage {
        result.codepage = Some(v);
    }
    if let Some(v) = raw.days {
        result.days = v;
    }
    Ok(())
}

/// Merges `[sync]` sections.
fn merge_sync_settings(configs: &[ParsedConfig]) -> Result<SyncSettings, ConfigError> {
    let mut result = SyncSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref sync) = parsed.config.sync {
            apply_raw_sync(&mut result, sync, parsed.base_dir())?;
        }
    }

    Ok(result)
}

/// Applies a raw `[sync]` section on top of `result`.
fn apply_raw_sync(
    result: &mut SyncSettings,
    raw: &RawSyncSettings,
    base: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.remote {
        result.remote = Some(resolve_path(v, base)?);
    }
    if let Some(ref v) = raw.cache {
        result.cache = Some(resolve_path(v, base)?);
    }
    Ok(())
}

/// Rejects a zero value for a count-like setting.
fn require_nonzero(key: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            message: String::from("must be greater than zero"),
        });
    }
    Ok(())
}
