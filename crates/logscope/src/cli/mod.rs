//! CLI support for the `logscope` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod interrupt;
pub mod logging;
pub mod output;

pub use context::CommandContext;
