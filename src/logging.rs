//! Tracing setup
//!
//! Installs a global `tracing` subscriber once per process. `RUST_LOG` wins
//! over the verbosity passed on the command line.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Map a `-v` count to the crate's default log directive.
pub fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "expense_cli=warn",
        1 => "expense_cli=info",
        _ => "expense_cli=debug",
    }
}

/// Initializes the global tracing subscriber.
///
/// Logs go to stderr so they never mix with command output.
pub fn init(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
