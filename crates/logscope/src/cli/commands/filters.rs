//! Implementation of `logscope filters`.

use std::process::ExitCode;

use logscope_index::filter_names;

use crate::cli::{args::FiltersCommand, context::CommandContext, output::dim};

/// Lists the filter names derived from the log files in a folder.
pub fn run(ctx: &CommandContext, cmd: &FiltersCommand) -> ExitCode {
    let fallback = &ctx.config.logs.filters;
    let names = match cmd
        .folder
        .as_deref()
        .map(|path| ctx.cwd.join(path))
        .or_else(|| ctx.config.logs.folder.clone())
    {
        Some(folder) => filter_names(&folder, fallback),
        None => fallback.clone(),
    };

    if names.is_empty() {
        println!("{}", dim("No log files found."));
        return ExitCode::SUCCESS;
    }
    for name in names {
        println!("{name}");
    }
    ExitCode::SUCCESS
}
