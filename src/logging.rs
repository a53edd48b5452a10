//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so the transcript on stdout stays readable.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "CHAOS_ORACLE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from [`LOG_ENV`], falling back to `warn` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Returns `false` if one was already installed.
pub fn init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_ok()
}
