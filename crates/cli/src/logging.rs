//! Subscriber setup.
//!
//! Filter precedence: `-v` flags, then `TRACEDOC_LOG`, then the
//! configuration's `log_filter`. Logs go to stderr so stdout stays
//! machine-readable.

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter
pub const LOG_ENV: &str = "TRACEDOC_LOG";

/// Pick the filter directive for this run.
pub fn filter_directive(verbosity: u8, env: Option<String>, configured: &str) -> String {
    match verbosity {
        0 => env
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| configured.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber.
///
/// An unparseable directive falls back to `info` with a warning rather than
/// failing the command.
pub fn init(verbosity: u8, configured: &str) {
    let directive = filter_directive(verbosity, std::env::var(LOG_ENV).ok(), configured);
    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Some(e) = rejected {
        tracing::warn!(directive = %directive, error = %e, "ignoring invalid log filter");
    }
}
