//! `ltc remove`: delete an app and all its instances.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::convergence::PollOutcome;
use crate::application::services::lifecycle;
use crate::commands::{EXIT_FAILURE, require_name};

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Name of the app
    pub name: Option<String>,
}

/// Run `ltc remove`.
///
/// # Errors
///
/// Returns an error on a missing name, missing target, or a rejected request.
pub async fn run(args: RemoveArgs, app: &AppContext) -> Result<ExitCode> {
    let name = require_name(args.name)?;
    let runner = app.runner()?;
    let reporter = app.reporter();

    match lifecycle::remove_app(&runner, &reporter, &name, app.timeout).await? {
        PollOutcome::Converged => {
            app.output.success(&format!("Successfully Removed {name}."));
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::TimedOut | PollOutcome::PlacementFailed => {
            app.output.error(&format!("Failed to remove {name}."));
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}
