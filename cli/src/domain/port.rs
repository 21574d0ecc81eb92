//! Exposed/monitored port resolution.
//!
//! Pure functions only: no I/O, no async.

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Port used when neither flags nor image metadata name one.
pub const DEFAULT_PORT: u16 = 8080;

/// Ports an app listens on, and the one the platform health-checks.
///
/// `monitored == 0` means monitoring is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub monitored: u16,
    pub exposed: Vec<u16>,
}

impl PortConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exposed.is_empty()
    }
}

/// Where a resolved [`PortConfig`] came from. Drives the advisory notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSource {
    /// `--ports` was given.
    Flags,
    /// Taken verbatim from the image's exposed ports.
    ImageMetadata,
    /// Nothing exposed and `--no-monitor` set: 8080, unmonitored.
    DefaultUnmonitored,
    /// Nothing exposed: 8080, monitored.
    Default,
}

/// Port flags after local validation, before image metadata is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRequest {
    Explicit(PortConfig),
    Unspecified { no_monitor: bool },
}

impl PortRequest {
    /// Validate the port flags.
    ///
    /// Tokens are sorted as strings before conversion, so `"9090,10000"`
    /// yields `[10000, 9090]`. Existing scripts rely on that ordering.
    ///
    /// A `monitored_port` of `Some(0)` counts as not given.
    ///
    /// # Errors
    ///
    /// Returns `MissingMonitoredPort` when several ports are listed without a
    /// monitored port while monitoring is on, and `InvalidPort` when a token is
    /// not an integer in `0..=65535`.
    pub fn parse(
        ports: Option<&str>,
        monitored_port: Option<u16>,
        no_monitor: bool,
    ) -> Result<Self, ValidationError> {
        let Some(expr) = ports.filter(|p| !p.is_empty()) else {
            return Ok(Self::Unspecified { no_monitor });
        };

        let mut tokens: Vec<&str> = expr.split(',').collect();
        let monitored_flag = monitored_port.filter(|p| *p != 0);
        if tokens.len() > 1 && monitored_flag.is_none() && !no_monitor {
            return Err(ValidationError::MissingMonitoredPort);
        }

        tokens.sort_unstable();
        let exposed = tokens
            .iter()
            .map(|t| t.parse::<u16>().map_err(|_| ValidationError::InvalidPort))
            .collect::<Result<Vec<_>, _>>()?;

        let monitored = match exposed.as_slice() {
            [only] => *only,
            _ => monitored_flag.unwrap_or(0),
        };
        Ok(Self::Explicit(PortConfig { monitored, exposed }))
    }

    /// Combine with the image's exposed ports.
    #[must_use]
    pub fn resolve(self, image_ports: &PortConfig) -> (PortConfig, PortSource) {
        match self {
            Self::Explicit(config) => (config, PortSource::Flags),
            Self::Unspecified { .. } if !image_ports.is_empty() => {
                (image_ports.clone(), PortSource::ImageMetadata)
            }
            Self::Unspecified { no_monitor: true } => (
                PortConfig {
                    monitored: 0,
                    exposed: vec![DEFAULT_PORT],
                },
                PortSource::DefaultUnmonitored,
            ),
            Self::Unspecified { no_monitor: false } => (
                PortConfig {
                    monitored: DEFAULT_PORT,
                    exposed: vec![DEFAULT_PORT],
                },
                PortSource::Default,
            ),
        }
    }
}
