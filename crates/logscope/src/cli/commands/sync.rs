//! Implementation of `logscope sync`.

use std::process::ExitCode;

use logscope_index::{BuildRequest, IndexError, sync_remote_files};

use super::index::build_and_report;
use crate::cli::{
    args::SyncCommand,
    context::CommandContext,
    interrupt::{INTERRUPTED, cancel_on_interrupt},
    output::StderrReporter,
};

/// Copies remote log files into the local cache, then optionally indexes the cache.
pub fn run(ctx: &CommandContext, cmd: &SyncCommand, verbose: u8) -> ExitCode {
    let remote = match ctx.folder_or(
        cmd.remote.as_deref(),
        ctx.config.sync.remote.as_deref(),
        "REMOTE",
        "sync.remote",
    ) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let local = match ctx.folder_or(
        cmd.local.as_deref(),
        ctx.config.sync.cache.as_deref(),
        "LOCAL",
        "sync.cache",
    ) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let range = match cmd.range.resolve(ctx.config.logs.days) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let filter = cmd
        .filter
        .clone()
        .unwrap_or_else(|| ctx.config.logs.filter.clone());
    let reporter = StderrReporter::new(cmd.quiet, verbose);

    let summary = match sync_remote_files(
        &remote,
        &local,
        &filter,
        range,
        &reporter,
        &cancel_on_interrupt(),
    ) {
        Ok(summary) => summary,
        Err(IndexError::Cancelled) => {
            eprintln!("Sync cancelled.");
            return ExitCode::from(INTERRUPTED);
        }
        Err(e) => {
            eprintln!("error: sync failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Synced {} files into {} ({} copied, {} up to date).",
        summary.paths.len(),
        local.display(),
        summary.copied,
        summary.skipped
    );
    if summary.failed > 0 {
        eprintln!("warning: {} files failed to copy", summary.failed);
    }

    if !cmd.index {
        return ExitCode::SUCCESS;
    }
    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };
    let request = BuildRequest {
        folder: local,
        filter,
        range,
    };
    build_and_report(&indexer, &request, reporter)
}
