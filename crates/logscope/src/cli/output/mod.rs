//! Rendering and JSON serialization for CLI output.

mod progress;

use std::process::ExitCode;

use logscope_index::{SearchResult, SearchResults, format_date};
use serde::Serialize;

pub use self::progress::StderrReporter;

/// ANSI escape codes used by the CLI.
mod colors {
    /// Resets all attributes.
    pub const RESET: &str = "\x1b[0m";
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Dimmed text.
    pub const DIM: &str = "\x1b[2m";
    /// Cyan foreground.
    pub const CYAN: &str = "\x1b[36m";
    /// Yellow foreground.
    pub const YELLOW: &str = "\x1b[33m";
}

/// Formats text as a header (bold cyan).
pub fn header(text: &str) -> String {
    format!("{}{}{}{}", colors::BOLD, colors::CYAN, text, colors::RESET)
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{}{}{}", colors::BOLD, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// JSON output for `search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The keyword as searched.
    keyword: &'a str,
    /// Matching lines, in display order.
    results: &'a [SearchResult],
    /// Lines shown.
    shown: usize,
    /// Lines matching in total, beyond the limit.
    total_hits: usize,
}

/// Prints search results as text rows or JSON.
pub fn output_search_results(keyword: &str, found: &SearchResults, json: bool) -> ExitCode {
    if json {
        let output = JsonSearchOutput {
            keyword,
            results: &found.results,
            shown: found.results.len(),
            total_hits: found.total_hits,
        };
        return print_json(&output);
    }

    for result in &found.results {
        println!("{}", format_result(result));
    }
    if !found.results.is_empty() {
        println!();
    }
    println!(
        "{}",
        dim(&format!(
            "showing {} of {} matching lines",
            found.results.len(),
            found.total_hits
        ))
    );
    ExitCode::SUCCESS
}

/// Formats one hit as `path:line [date] content`, with a 1-based line.
fn format_result(result: &SearchResult) -> String {
    format!(
        "{}:{} {} {}",
        header(&result.file_path),
        result.line_number + 1,
        dim(&format!("[{}]", format_date(result.file_date))),
        result.content
    )
}

/// Pretty-prints a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}
