//! Implementation of `logscope clear`.

use std::process::ExitCode;

use crate::cli::context::CommandContext;

/// Removes every document from the index.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };
    match indexer.clear() {
        Ok(()) => {
            println!("Cleared index at {}", indexer.index_dir().display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to clear index: {e}");
            ExitCode::FAILURE
        }
    }
}
