//! Diagnostic logging initialization.

use tracing_subscriber::{EnvFilter, fmt};

/// Legacy verbosity switch, e.g. `LTC_LOG_LEVEL=DEBUG`.
pub const LOG_LEVEL_ENV: &str = "LTC_LOG_LEVEL";

const DEFAULT_LEVEL: &str = "warn";

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub fn fallback_level(ltc_log_level: Option<&str>) -> String {
    ltc_log_level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map_or_else(|| DEFAULT_LEVEL.to_string(), str::to_lowercase)
}

/// Install the global subscriber. Diagnostics go to stderr so they never mix
/// with command output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = fallback_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    });

    // A second init (tests) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
