use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Installs the stderr logger. `RUST_LOG` overrides the flag-derived level.
/// Colours are only emitted when stderr is a terminal.
pub fn init_logging(verbose: u8, quiet: bool) {
    let default_level = default_level(verbose, quiet);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
