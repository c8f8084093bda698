//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`. `-v`/`-q` pick the level,
//! `log_level` in the config or `RUST_LOG` override it.

use addrbook_core::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity, configured: Option<&str>) {
    let directive = match configured {
        Some(level) => level.to_string(),
        None => {
            let level = level_name(verbosity);
            format!("addrbook_core={level},addrbook_cli={level}")
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log level for a verbosity
fn level_name(verbosity: Verbosity) -> &'static str {
    match verbosity.level() {
        0 => "off",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}
