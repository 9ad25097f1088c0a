//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use logscope_config::Config;
use logscope_index::{Indexer, SearchEngine, index_directory};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns the index directory for this configuration.
    pub fn index_dir(&self) -> Result<PathBuf, ExitCode> {
        index_directory(&self.config).ok_or_else(|| {
            eprintln!("error: could not determine index directory; set index.path");
            ExitCode::FAILURE
        })
    }

    /// Creates an indexer from the configuration.
    pub fn indexer(&self) -> Result<Indexer, ExitCode> {
        Indexer::new(&self.config).map_err(|e| {
            eprintln!("error: failed to initialize indexer: {e}");
            ExitCode::FAILURE
        })
    }

    /// Creates a search engine over the configured index.
    pub fn search_engine(&self) -> Result<SearchEngine, ExitCode> {
        let index_dir = self.index_dir()?;
        Ok(SearchEngine::new(
            index_dir,
            self.config.index.stemmer.clone(),
            self.config.index.max_results,
        ))
    }

    /// Returns `arg` if given, otherwise the configured log folder.
    pub fn log_folder(&self, arg: Option<&Path>) -> Result<PathBuf, ExitCode> {
        self.folder_or(arg, self.config.logs.folder.as_deref(), "FOLDER", "logs.folder")
    }

    /// Returns `arg` relative to the working directory, or the configured fallback.
    ///
    /// Fails with a hint naming both the argument and the config key.
    pub fn folder_or(
        &self,
        arg: Option<&Path>,
        configured: Option<&Path>,
        arg_name: &str,
        key: &str,
    ) -> Result<PathBuf, ExitCode> {
        if let Some(path) = arg {
            return Ok(self.cwd.join(path));
        }
        configured.map(Path::to_path_buf).ok_or_else(|| {
            eprintln!("error: no {arg_name} given and {key} is not configured");
            eprintln!("Pass {arg_name} or set {key} in .logscope.toml (see 'logscope init').");
            ExitCode::FAILURE
        })
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
