//! Utilities: logging setup (level from -v/-q, RUST_LOG / CLI_MCP_LOG override).
//!
//! Key items:
//!   derive_level / init_logging
//!
//! Logs always go to stderr: stdout carries JSON output and, for `serve`,
//! the MCP stdio transport.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable read when `RUST_LOG` is not set.
pub const LOG_ENV: &str = "CLI_MCP_LOG";

/// `-q` -> error, default -> info, `-v` -> debug, `-vv` -> trace.
pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Filter directives: `RUST_LOG`, then `CLI_MCP_LOG`, then `level`.
pub fn filter_directives(level: LevelFilter) -> String {
    [std::env::var("RUST_LOG"), std::env::var(LOG_ENV)]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| level.to_string().to_lowercase())
}

/// Install the global stderr subscriber. Calling it twice is a no-op.
pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(filter_directives(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
