//! Domain types and validators for ltc configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Poll budget used when `LATTICE_CLI_TIMEOUT` is unset or unparsable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ── Config schema ────────────────────────────────────────────────────────────

/// Persisted target configuration (`~/.lattice/config.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LtcConfig {
    /// Cluster domain, e.g. `192.168.11.11.xip.io`.
    pub target: Option<String>,
    /// Receptor basic-auth user; empty when the receptor is open.
    pub username: String,
    pub password: String,
}

impl LtcConfig {
    /// The configured target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTarget` if no target has been set.
    pub fn require_target(&self) -> Result<&str, ConfigError> {
        self.target
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::NoTarget)
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

// ── Validators / derivations ─────────────────────────────────────────────────

/// Validate a target domain given to `ltc target`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidTarget` for empty values, values with a scheme,
/// paths, or whitespace.
pub fn validate_target(target: &str) -> Result<(), ConfigError> {
    let bad = target.is_empty()
        || target.contains("://")
        || target.contains('/')
        || target.chars().any(char::is_whitespace);
    if bad {
        return Err(ConfigError::InvalidTarget(target.to_string()));
    }
    Ok(())
}

/// Parse the `LATTICE_CLI_TIMEOUT` value (whole seconds).
#[must_use]
pub fn parse_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
}

#[must_use]
pub fn receptor_url(target: &str) -> String {
    format!("http://receptor.{target}")
}

#[must_use]
pub fn loggregator_url(target: &str) -> String {
    format!("ws://doppler.{target}")
}

/// Public URL of an app's primary route.
#[must_use]
pub fn app_url(name: &str, target: &str) -> String {
    format!("http://{name}.{target}")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
