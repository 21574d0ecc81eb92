//! `ltc logs`: stream an app's logs until interrupted.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::domain::UsageError;

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Name of the app
    pub name: Option<String>,
}

/// Run `ltc logs`.
///
/// # Errors
///
/// Returns an error on a missing name, missing target, or a broken stream.
pub async fn run(args: LogsArgs, app: &AppContext) -> Result<ExitCode> {
    let Some(name) = args.name.filter(|n| !n.is_empty()) else {
        return Err(UsageError::new("").into());
    };
    let tailer = app.tailer()?;
    tailer.stream(&name).await?;
    Ok(ExitCode::SUCCESS)
}
