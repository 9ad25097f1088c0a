//! Implementation of `logscope search`.

use std::process::ExitCode;

use logscope_index::{SearchOptions, SortOrder, index_exists};
use tracing::debug;

use crate::cli::{args::SearchCommand, context::CommandContext, output::output_search_results};

/// Searches indexed log lines and prints the matches.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    if let (Some(from), Some(to)) = (cmd.from, cmd.to)
        && from > to
    {
        eprintln!("error: --from {from} is after --to {to}");
        return ExitCode::FAILURE;
    }

    let engine = match ctx.search_engine() {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    if !index_exists(engine.index_dir()) {
        eprintln!(
            "warning: no index at {}; run 'logscope index' first",
            engine.index_dir().display()
        );
    }

    let keyword = cmd.keywords.join(" ");
    let options = SearchOptions {
        limit: cmd.limit,
        from: cmd.from,
        to: cmd.to,
        order: if cmd.relevance {
            SortOrder::Relevance
        } else {
            SortOrder::DateDescending
        },
    };

    debug!(keyword = %keyword, ?options, "searching");
    let found = match engine.search(&keyword, &options) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    engine.close();

    output_search_results(&keyword, &found, cmd.json)
}
