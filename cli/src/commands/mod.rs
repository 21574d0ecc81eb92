//! Command implementations
//!
//! Every command returns the process exit code. Failures that escape a
//! command are rendered by [`report_failure`].

pub mod logs;
pub mod remove;
pub mod scale;
pub mod start;
pub mod stop;
pub mod target;

use std::process::ExitCode;

use crate::domain::UsageError;
use crate::output::OutputContext;

/// Generic failure, including poll timeouts.
pub const EXIT_FAILURE: u8 = 1;
/// Missing or malformed arguments.
pub const EXIT_USAGE: u8 = 2;
/// The scheduler could not place every requested instance.
pub const EXIT_PLACEMENT_FAILED: u8 = 4;
/// Interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Print a failed command's error and pick its exit code.
#[must_use]
pub fn report_failure(ctx: &OutputContext, err: &anyhow::Error) -> ExitCode {
    if let Some(usage) = err.downcast_ref::<UsageError>() {
        ctx.incorrect_usage(&usage.0);
        return ExitCode::from(EXIT_USAGE);
    }
    ctx.error(&format!("{err:#}"));
    ExitCode::from(EXIT_FAILURE)
}

/// Positional app name, required by every lifecycle command.
fn require_name(name: Option<String>) -> Result<String, UsageError> {
    name.filter(|n| !n.is_empty())
        .ok_or_else(|| UsageError::new("App Name required"))
}
