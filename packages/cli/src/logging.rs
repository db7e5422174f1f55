//! Tracing subscriber setup.
//!
//! Logs go to stderr so `ufs cat` output stays clean. `RUST_LOG` wins over
//! the `-v` count when set.

use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Level selected by the number of `-v` flags.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).as_str().to_ascii_lowercase()))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_filter(verbosity))
        .try_init();
}
