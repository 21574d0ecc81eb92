//! `ltc target`: show or set the cluster the other commands talk to.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::domain::config::validate_target;

/// Arguments for the target command.
#[derive(Args)]
pub struct TargetArgs {
    /// Cluster domain, e.g. `192.168.11.11.xip.io`; omit to show the current one
    pub domain: Option<String>,

    /// Receptor user
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Receptor password
    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

/// Run `ltc target`.
///
/// # Errors
///
/// Returns an error if the domain is invalid or the config cannot be saved.
pub fn run(args: TargetArgs, app: &AppContext) -> Result<ExitCode> {
    let ctx = &app.output;
    let Some(domain) = args.domain else {
        match app.config.target.as_deref() {
            Some(target) if !target.is_empty() => {
                ctx.kv("Target", target);
                if app.config.has_credentials() {
                    ctx.kv("Username", &app.config.username);
                }
            }
            _ => ctx.info("Target not set."),
        }
        return Ok(ExitCode::SUCCESS);
    };

    validate_target(&domain)?;
    let mut config = app.config.clone();
    config.target = Some(domain);
    config.username = args.username.unwrap_or_default();
    config.password = args.password.unwrap_or_default();
    app.config_store.save(&config)?;
    tracing::debug!(path = ?app.config_store.path().ok(), "saved target");

    ctx.success("Api Location Set");
    Ok(ExitCode::SUCCESS)
}
