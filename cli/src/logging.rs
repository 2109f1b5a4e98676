//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `KUBEBOOT_LOG` environment variable (a level or full filter directives)
//! 3. default to `warn`
//!
//! Logs go to STDERR so that stdout stays clean for command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "KUBEBOOT_LOG";

/// Initialise the global logging subscriber. Later calls are no-ops.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let _ = fmt()
        .with_env_filter(filter(cli_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}
