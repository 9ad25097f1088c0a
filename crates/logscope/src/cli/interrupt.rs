//! Ctrl-C handling for long-running commands.
//!
//! The first interrupt cancels the running build or sync, which stops after the
//! current file and removes its shard directories. A second one exits at once.

use std::{process, sync::OnceLock};

use logscope_index::CancelToken;
use tracing::warn;

/// Exit code for a run stopped by Ctrl-C.
pub const INTERRUPTED: u8 = 130;

/// Token cancelled by Ctrl-C, shared by every command of this process.
static TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Returns the process-wide token, installing the Ctrl-C handler on first use.
pub fn cancel_on_interrupt() -> CancelToken {
    TOKEN
        .get_or_init(|| {
            let token = CancelToken::new();
            let handler_token = token.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                if on_interrupt(&handler_token) {
                    process::exit(i32::from(INTERRUPTED));
                }
                eprintln!("interrupted, stopping after the current file (Ctrl-C again to quit)");
            }) {
                warn!(error = %e, "cannot install Ctrl-C handler");
            }
            token
        })
        .clone()
}

/// Cancels `token`. Returns true when it was already cancelled.
fn on_interrupt(token: &CancelToken) -> bool {
    let repeated = token.is_cancelled();
    token.cancel();
    repeated
}
