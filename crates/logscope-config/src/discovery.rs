//! Finds the `.logscope.toml` files that apply to a working directory.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".logscope.toml";

/// Returns config files for `cwd`, highest precedence first.
///
/// Every ancestor of `cwd` holding a `.logscope.toml` contributes, nearest first.
/// A file with `root = true` ends the list. Otherwise `~/.logscope.toml` comes last.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    discover_from(cwd, global_config_path().as_deref())
}

/// Discovery with an explicit global config location.
fn discover_from(cwd: &Path, global: Option<&Path>) -> Vec<PathBuf> {
    let mut configs = Vec::new();
    for candidate in cwd.ancestors().map(|dir| dir.join(CONFIG_FILENAME)) {
        if !candidate.is_file() {
            continue;
        }
        let stop = is_root_config(&candidate);
        configs.push(candidate);
        if stop {
            return configs;
        }
    }

    if let Some(global) = global
        && global.is_file()
        && configs.iter().all(|path| path != global)
    {
        configs.push(global.to_path_buf());
    }
    configs
}

/// Location of `~/.logscope.toml`, or `None` without a home directory.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// True if `path` is `~/.logscope.toml`.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
