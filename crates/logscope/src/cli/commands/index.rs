//! Implementation of `logscope index`.

use std::process::ExitCode;

use logscope_index::{BuildRequest, IndexError, IndexStats, Indexer, format_duration};
use tracing::info;

use crate::cli::{
    args::IndexCommand,
    context::CommandContext,
    interrupt::{INTERRUPTED, cancel_on_interrupt},
    output::{StderrReporter, dim},
};

/// Indexes new log files in a folder.
pub fn run(ctx: &CommandContext, cmd: &IndexCommand, verbose: u8) -> ExitCode {
    let folder = match ctx.log_folder(cmd.folder.as_deref()) {
        Ok(folder) => folder,
        Err(code) => return code,
    };
    let range = match cmd.range.resolve(ctx.config.logs.days) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };

    let request = BuildRequest {
        folder,
        filter: cmd
            .filter
            .clone()
            .unwrap_or_else(|| ctx.config.logs.filter.clone()),
        range,
    };
    build_and_report(&indexer, &request, StderrReporter::new(cmd.quiet, verbose))
}

/// Runs a build and prints its summary. Shared with `sync --index`.
pub fn build_and_report(
    indexer: &Indexer,
    request: &BuildRequest,
    reporter: StderrReporter,
) -> ExitCode {
    info!(
        folder = %request.folder.display(),
        filter = %request.filter,
        from = %request.range.start,
        to = %request.range.end,
        index = %indexer.index_dir().display(),
        "building index"
    );
    match indexer.build(request, &reporter, &cancel_on_interrupt()) {
        Ok(stats) => {
            print_summary(&stats);
            ExitCode::SUCCESS
        }
        Err(IndexError::Cancelled) => {
            eprintln!("Indexing cancelled; no new files were added.");
            ExitCode::from(INTERRUPTED)
        }
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints the build statistics.
fn print_summary(stats: &IndexStats) {
    if stats.is_up_to_date() {
        println!(
            "Index is up to date ({} files already indexed).",
            stats.files_skipped
        );
        return;
    }
    println!(
        "Indexed {} files ({} lines) in {}.",
        stats.files_indexed,
        stats.documents,
        format_duration(stats.elapsed)
    );
    let mut details = vec![
        format!("{} candidates", stats.candidates),
        format!("{} already indexed", stats.files_skipped),
    ];
    if stats.live_rescanned > 0 {
        details.push(format!("{} live files rescanned", stats.live_rescanned));
    }
    if stats.files_failed > 0 {
        details.push(format!("{} failed", stats.files_failed));
    }
    details.push(format!("{} shards", stats.shards));
    println!("{}", dim(&details.join(", ")));
}
