//! `ltc stop`: scale an app to zero instances.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::lifecycle;
use crate::commands::{require_name, scale};

/// Arguments for the stop command.
#[derive(Args)]
pub struct StopArgs {
    /// Name of the app
    pub name: Option<String>,
}

/// Run `ltc stop`.
///
/// # Errors
///
/// Returns an error on a missing name, missing target, or a rejected request.
pub async fn run(args: StopArgs, app: &AppContext) -> Result<ExitCode> {
    let name = require_name(args.name)?;
    let runner = app.runner()?;
    let reporter = app.reporter();

    let outcome = lifecycle::stop_app(&runner, &reporter, &name, app.timeout).await?;
    Ok(scale::report(app, &name, outcome, "stop"))
}
