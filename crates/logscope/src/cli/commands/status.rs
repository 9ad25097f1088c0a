//! Implementation of `logscope status`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use logscope_config::{discover_config_files, format_path_for_display, is_global_config};
use logscope_index::{IndexStatus, summarize_index};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows configuration files, log settings and index status.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;
    let config = &ctx.config;

    let config_files = discover_config_files(cwd);
    println!("{}", subheader("Config files:"));
    if config_files.is_empty() {
        println!("   {}", dim("(none, using defaults)"));
        println!(
            "   Run {} to create a configuration file.",
            subheader("logscope init")
        );
    } else {
        for path in &config_files {
            let scope = if is_global_config(path) {
                "global"
            } else {
                "project"
            };
            println!(
                "   {} {}",
                format_path_for_display(path, cwd),
                dim(&format!("({scope})"))
            );
        }
    }
    println!();

    println!("{}", subheader("Logs:"));
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Setting", "Value"]);
    let folder = config.logs.folder.as_ref().map_or_else(
        || String::from("(not set)"),
        |path| format_path_for_display(path, cwd),
    );
    let encoding = config.logs.codepage.map_or_else(
        || config.logs.encoding.clone(),
        |codepage| format!("code page {codepage}"),
    );
    let filter = if config.logs.filter.is_empty() {
        String::from("(all files)")
    } else {
        config.logs.filter.clone()
    };
    table.add_row(vec![Cell::new("folder"), Cell::new(folder)]);
    table.add_row(vec![Cell::new("filter"), Cell::new(filter)]);
    table.add_row(vec![Cell::new("encoding"), Cell::new(encoding)]);
    table.add_row(vec![
        Cell::new("days"),
        Cell::new(config.logs.days.to_string()),
    ]);
    println!("{table}");
    println!();

    let index_dir = match ctx.index_dir() {
        Ok(dir) => dir,
        Err(code) => return code,
    };
    let summary = match summarize_index(&index_dir) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: failed to read index: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{}\n   {} {}",
        subheader("Index:"),
        summary.status.description(),
        dim(&format!("({})", index_dir.display()))
    );
    if summary.status != IndexStatus::Missing {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Files", "Lines"]);
        table.add_row(vec![
            Cell::new(summary.files.to_string()),
            Cell::new(summary.documents.to_string()),
        ]);
        println!("{table}");
    }

    if !summary.stale_shards.is_empty() {
        println!();
        println!(
            "   {}",
            warning(&format!(
                "{} shard directories left by an interrupted build",
                summary.stale_shards.len()
            ))
        );
        for dir in &summary.stale_shards {
            println!("      {}", dim(&dir.display().to_string()));
        }
        println!(
            "{}",
            dim("Hint: the next 'logscope index' removes them")
        );
    }

    ExitCode::SUCCESS
}
