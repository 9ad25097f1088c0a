//! Clap argument definitions for the `logscope` CLI.

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use logscope_index::{DateRange, today};

/// Parses a date given as `YYYY-MM-DD` or `YYYYMMDD`.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD or YYYYMMDD"))
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "logscope", version)]
#[command(about = "Incremental full-text search over rotating log files")]
pub struct Cli {
    /// Log more detail to stderr (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Date range flags shared by `index` and `sync`.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First file date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last file date to include (YYYY-MM-DD) [default: today]
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Number of days ending at --to to include [default: logs.days]
    #[arg(long, conflicts_with = "from")]
    pub days: Option<u32>,
}

impl RangeArgs {
    /// Resolves the flags into a date range, using `default_days` when neither
    /// `--from` nor `--days` is given.
    pub fn resolve(&self, default_days: u32) -> Result<DateRange, String> {
        let end = self.to.unwrap_or_else(today);
        let start = match self.from {
            Some(from) => from,
            None => {
                let days = self.days.unwrap_or(default_days).max(1);
                end.checked_sub_days(Days::new(u64::from(days - 1)))
                    .unwrap_or(NaiveDate::MIN)
            }
        };
        if start > end {
            return Err(format!("--from {start} is after --to {end}"));
        }
        Ok(DateRange::new(start, end))
    }
}

/// Arguments for `logscope init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global config (~/.logscope.toml) instead of local
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `logscope index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    /// Folder holding the log files [default: logs.folder]
    pub folder: Option<PathBuf>,

    /// Only index files whose name contains this text [default: logs.filter]
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Date range of files to index.
    #[command(flatten)]
    pub range: RangeArgs,

    /// Only print the final summary
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Arguments for `logscope search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Keywords; every keyword must appear in a matching line
    #[arg(required = true)]
    pub keywords: Vec<String>,

    /// Maximum lines to show [default: index.max_results]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Only lines from files dated on or after this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Only lines from files dated on or before this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Order by relevance instead of newest file first
    #[arg(long)]
    pub relevance: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `logscope sync`.
#[derive(Args, Debug, Clone)]
pub struct SyncCommand {
    /// Remote folder to copy from [default: sync.remote]
    pub remote: Option<PathBuf>,

    /// Local cache folder to copy into [default: sync.cache]
    pub local: Option<PathBuf>,

    /// Only copy files whose name contains this text [default: logs.filter]
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Date range of files to copy.
    #[command(flatten)]
    pub range: RangeArgs,

    /// Index the local cache after copying
    #[arg(long)]
    pub index: bool,

    /// Only print the final summary
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Arguments for `logscope filters`.
#[derive(Args, Debug, Clone)]
pub struct FiltersCommand {
    /// Folder to scan [default: logs.folder]
    pub folder: Option<PathBuf>,
}

/// Supported `logscope` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a .logscope.toml configuration file
    Init(InitCommand),

    /// Index new log files in a folder
    Index(IndexCommand),

    /// Search indexed log lines
    Search(SearchCommand),

    /// Remove every document from the index
    Clear,

    /// Copy log files from a remote folder into a local cache
    Sync(SyncCommand),

    /// Show configuration and index status
    Status,

    /// List log file name filters found in a folder
    Filters(FiltersCommand),
}

/// Parses command-line arguments, exiting on error or help.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
