//! The fully resolved description of an app launch.

use std::collections::BTreeMap;

use crate::domain::image::ImageReference;
use crate::domain::port::PortConfig;
use crate::domain::route::RouteOverride;

/// Memory limit applied when `--memory-mb` is not given.
pub const DEFAULT_MEMORY_MB: u32 = 128;
/// Disk limit applied when `--disk-mb` is not given.
pub const DEFAULT_DISK_MB: u32 = 1024;
/// Working directory used when neither the flag nor the image sets one.
pub const DEFAULT_WORKING_DIR: &str = "/";

/// Everything the orchestration service needs to run an app.
///
/// Built once per `ltc start`, never mutated, consumed by the submission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub name: String,
    pub image: ImageReference,
    pub start_command: String,
    pub args: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub privileged: bool,
    /// Whether the platform health-checks `ports.monitored`.
    pub monitor: bool,
    pub instances: u32,
    pub memory_mb: u32,
    pub disk_mb: u32,
    pub ports: PortConfig,
    pub working_dir: String,
    pub route_overrides: Vec<RouteOverride>,
}

impl LaunchSpec {
    /// Port advertised to the app through `$PORT`.
    #[must_use]
    pub fn primary_port(&self) -> u16 {
        if self.ports.monitored != 0 {
            return self.ports.monitored;
        }
        self.ports.exposed.first().copied().unwrap_or(0)
    }
}
