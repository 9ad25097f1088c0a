//! Command implementations and dispatch.

pub mod clear;
pub mod filters;
pub mod index;
pub mod init;
pub mod search;
pub mod status;
pub mod sync;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, verbose: u8, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Index(cmd) => index::run(ctx, &cmd, verbose),
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Clear => clear::run(ctx),
        Commands::Sync(cmd) => sync::run(ctx, &cmd, verbose),
        Commands::Status => status::run(ctx),
        Commands::Filters(cmd) => filters::run(ctx, &cmd),
    }
}
