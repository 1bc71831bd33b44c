//! Diagnostic logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. The filter is
//! `BRANCHWISE_LOG` if set, otherwise derived from `-v` flags, then the
//! configured level, then `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BRANCHWISE_LOG";

/// Filter directive for a verbosity count and an optional configured level.
pub fn default_directive(verbosity: u8, configured: Option<&str>) -> String {
    let level = match verbosity {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("branchwise={level}")
}

pub fn init(verbosity: u8, configured: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, configured)));

    // A second init (tests, embedding) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
