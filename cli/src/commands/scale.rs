//! `ltc scale`: change the number of running instances.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::convergence::PollOutcome;
use crate::application::services::lifecycle;
use crate::commands::{EXIT_FAILURE, require_name};
use crate::domain::UsageError;

/// Arguments for the scale command.
#[derive(Args)]
pub struct ScaleArgs {
    /// Name of the app
    pub name: Option<String>,

    /// Desired number of instances
    pub instances: Option<String>,
}

/// Validate `ltc scale` positionals.
///
/// # Errors
///
/// Returns a `UsageError` for a missing name or count, or a count that is not
/// a non-negative integer.
pub fn parse_scale_args(
    name: Option<String>,
    instances: Option<&str>,
) -> Result<(String, u32), UsageError> {
    let name = require_name(name)?;
    let instances = instances
        .filter(|i| !i.is_empty())
        .ok_or_else(|| UsageError::new("Number of Instances Required"))?;
    let instances = instances
        .parse::<u32>()
        .map_err(|_| UsageError::new("Number of Instances must be an integer"))?;
    Ok((name, instances))
}

/// Run `ltc scale`.
///
/// # Errors
///
/// Returns an error on bad arguments, missing target, or a rejected request.
pub async fn run(args: ScaleArgs, app: &AppContext) -> Result<ExitCode> {
    let (name, instances) = parse_scale_args(args.name, args.instances.as_deref())?;
    let runner = app.runner()?;
    let reporter = app.reporter();

    let outcome = lifecycle::scale_app(&runner, &reporter, &name, instances, app.timeout).await?;
    Ok(report(app, &name, outcome, "scale"))
}

/// Shared by `scale` and `stop`.
pub(crate) fn report(app: &AppContext, name: &str, outcome: PollOutcome, verb: &str) -> ExitCode {
    match outcome {
        PollOutcome::Converged => {
            app.output.success("App Scaled Successfully");
            ExitCode::SUCCESS
        }
        // Scale polling only watches the running count.
        PollOutcome::TimedOut | PollOutcome::PlacementFailed => {
            app.output.error(&format!("{name} took too long to {verb}."));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
