//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output context, the loaded target configuration, and
//! the poll budget. Port implementations are built on demand so commands that
//! need no target (`ltc target`) never touch the network.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::LtcConfig;
use crate::domain::config::parse_timeout;
use crate::infra::config::YamlConfigStore;
use crate::infra::logs::DopplerTailer;
use crate::infra::receptor::ReceptorClient;
use crate::infra::registry::RegistryMetadataFetcher;
use crate::output::{OutputContext, TerminalReporter};

/// Environment variable holding the poll budget in seconds.
pub const TIMEOUT_ENV: &str = "LATTICE_CLI_TIMEOUT";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Where the target configuration lives.
    pub config_store: YamlConfigStore,
    /// Target configuration as loaded at startup.
    pub config: LtcConfig,
    /// Budget for every convergence poll.
    pub timeout: Duration,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read.
    pub fn new(flags: &OutputFlags) -> Result<Self> {
        let config_store = YamlConfigStore;
        let config = config_store.load()?;
        let timeout = parse_timeout(std::env::var(TIMEOUT_ENV).ok().as_deref());
        tracing::debug!(configured_target = ?config.target, ?timeout, "context ready");

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config_store,
            config,
            timeout,
        })
    }

    /// Receptor client for the configured target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTarget` if no target is set.
    pub fn runner(&self) -> Result<ReceptorClient> {
        let target = self.config.require_target()?;
        ReceptorClient::new(target, &self.config)
    }

    /// Registry client for image metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn fetcher(&self) -> Result<RegistryMetadataFetcher> {
        RegistryMetadataFetcher::new()
    }

    /// Log tailer for the configured target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTarget` if no target is set.
    pub fn tailer(&self) -> Result<DopplerTailer> {
        let target = self.config.require_target()?;
        Ok(DopplerTailer::new(target))
    }

    /// Progress reporter writing to this context's terminal.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
