//! Diagnostics go to stderr so stdout stays a clean script for the editor.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "BOOKMARK_LOG";

/// Filter directive from `BOOKMARK_LOG`, else the configured level.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level.trim()))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
