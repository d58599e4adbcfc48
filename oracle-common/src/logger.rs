use tracing_subscriber::{EnvFilter, fmt};

use crate::LogLevel;

/// Initializes tracing, preferring `RUST_LOG` and falling back to `level`.
///
/// Intended for binaries; tests should prefer [`try_init`] so a second
/// initialisation does not panic.
///
/// ```no_run
/// use oracle_common::{LogLevel, logger};
/// logger::init(LogLevel::Info);
/// ```
pub fn init(level: LogLevel) {
    fmt().with_env_filter(filter(level)).init();
}

/// Attempts to initialize tracing and returns an error if a subscriber is
/// already set.
pub fn try_init(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt().with_env_filter(filter(level)).try_init()
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}
