//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Usage errors ──────────────────────────────────────────────────────────────

/// Missing or malformed positional arguments.
///
/// Raised before any network call. The command boundary downcasts to this
/// type to print the "Incorrect Usage" banner and exit with the usage code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

impl UsageError {
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// Local validation failures for launch flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "Invalid port specified. Ports must be a comma-delimited list of integers between 0-65535."
    )]
    InvalidPort,

    #[error("Malformed route. Routes must be of the format port:route")]
    MalformedRoute,

    #[error(
        "Must set monitored-port when specifying multiple exposed ports unless --no-monitor is set."
    )]
    MissingMonitoredPort,
}

// ── Launch errors ─────────────────────────────────────────────────────────────

/// Failures while resolving or submitting a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Error fetching image metadata: {0}")]
    MetadataFetch(String),

    #[error("Error fetching image metadata: image '{0}' does not define a start command")]
    EmptyStartCommand(String),

    #[error("Error Starting App: {0}")]
    Start(String),

    #[error("Error Scaling App to {instances} instances: {reason}")]
    Scale { instances: u32, reason: String },

    #[error("Error Stopping App: {0}")]
    Remove(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the persisted target configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No target set. Run: ltc target <domain>")]
    NoTarget,

    #[error("Invalid target '{0}': expected a bare domain such as 'my-lattice.example.com'")]
    InvalidTarget(String),
}
