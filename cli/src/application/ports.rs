//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use anyhow::Result;
use tokio::sync::oneshot;

use crate::domain::{ImageMetadata, ImageReference, LaunchSpec, LtcConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Observed instance state of one app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceCount {
    /// Instances reported as running.
    pub running: u32,
    /// The scheduler could not place at least one instance anywhere.
    pub placement_failed: bool,
}

// ── Orchestration Port ────────────────────────────────────────────────────────

/// Calls against the orchestration service.
#[allow(async_fn_in_trait)]
pub trait AppRunner {
    /// Submit a new app.
    async fn start_app(&self, spec: &LaunchSpec) -> Result<()>;
    /// Set the desired instance count of an existing app.
    async fn scale_app(&self, name: &str, instances: u32) -> Result<()>;
    /// Remove an app and all its instances.
    async fn remove_app(&self, name: &str) -> Result<()>;
    /// Count running instances and report placement failures.
    async fn running_instances(&self, name: &str) -> Result<InstanceCount>;
    /// Whether the service still knows about the app.
    async fn app_exists(&self, name: &str) -> Result<bool>;
}

// ── Image Metadata Port ───────────────────────────────────────────────────────

/// Reads launch settings (command, working dir, ports) baked into an image.
#[allow(async_fn_in_trait)]
pub trait ImageMetadataFetcher {
    async fn fetch(&self, image: &ImageReference) -> Result<ImageMetadata>;
}

// ── Log Tailing Port ──────────────────────────────────────────────────────────

/// Streams an app's logs to the console in the background.
pub trait LogTailer {
    /// Start tailing `app_name`. The stream runs until the returned handle is
    /// stopped or dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the tail task cannot be set up.
    fn tail(&self, app_name: &str) -> Result<TailHandle>;
}

/// Owner of a running log tail.
///
/// `stop` consumes the handle, so a tail is signalled at most once. Nobody
/// waits for the task to acknowledge.
#[derive(Debug)]
pub struct TailHandle {
    stop: oneshot::Sender<()>,
}

impl TailHandle {
    #[must_use]
    pub fn new(stop: oneshot::Sender<()>) -> Self {
        Self { stop }
    }

    /// Signal the tail task to finish.
    pub fn stop(self) {
        // The task may already be gone; nothing to do then.
        let _ = self.stop.send(());
    }
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit one progress marker on the current line.
    fn tick(&self);
    /// Terminate the current progress line.
    fn end_ticks(&self);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts persistence of the target configuration.
pub trait ConfigStore {
    /// Load the config, returning defaults when none has been saved.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    fn load(&self) -> Result<LtcConfig>;
    /// Persist the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &LtcConfig) -> Result<()>;
    /// Location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    fn path(&self) -> Result<std::path::PathBuf>;
}
