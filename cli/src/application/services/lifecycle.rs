//! Application service: start, scale, stop, and remove use-cases.
//!
//! Each use-case submits one request to the orchestration service and then
//! polls until the cluster reflects it. Submission is never retried here.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{AppRunner, ImageMetadataFetcher, LogTailer, ProgressReporter};
use crate::application::services::convergence::{PollOutcome, PollSignal, poll_until};
use crate::application::services::launch_spec::{PreparedLaunch, resolve_launch_spec};
use crate::domain::{LaunchError, LaunchSpec};

/// Resolve, submit, and wait for a new app.
///
/// Logs are tailed from submission until the poll ends.
///
/// # Errors
///
/// Returns an error if the launch spec cannot be resolved or the submission
/// is rejected. Timeouts and placement failures are outcomes, not errors.
pub async fn start_app(
    fetcher: &impl ImageMetadataFetcher,
    runner: &impl AppRunner,
    tailer: &impl LogTailer,
    reporter: &impl ProgressReporter,
    prepared: PreparedLaunch,
    process_env: &[String],
    timeout: Duration,
) -> Result<PollOutcome> {
    let spec = resolve_launch_spec(fetcher, reporter, prepared, process_env).await?;
    launch(runner, tailer, reporter, &spec, timeout).await
}

/// Submit a resolved spec and wait for all its instances to run.
///
/// # Errors
///
/// Returns `LaunchError::Start` if the orchestration service rejects the app.
pub async fn launch(
    runner: &impl AppRunner,
    tailer: &impl LogTailer,
    reporter: &impl ProgressReporter,
    spec: &LaunchSpec,
    timeout: Duration,
) -> Result<PollOutcome> {
    runner
        .start_app(spec)
        .await
        .map_err(|e| LaunchError::Start(format!("{e:#}")))?;
    reporter.step(&format!("Starting App: {}", spec.name));

    let tail = match tailer.tail(&spec.name) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(app = %spec.name, error = %e, "log tail unavailable");
            None
        }
    };

    let name = spec.name.as_str();
    let wanted = spec.instances;
    let outcome = poll_until(
        move || async move {
            match runner.running_instances(name).await {
                Ok(count) if count.placement_failed => PollSignal::PlacementFailed,
                Ok(count) if count.running == wanted => PollSignal::Converged,
                Ok(_) => PollSignal::Pending,
                Err(e) => {
                    tracing::debug!(app = name, error = %e, "instance query failed");
                    PollSignal::Pending
                }
            }
        },
        timeout,
        reporter,
        false,
    )
    .await;

    if let Some(tail) = tail {
        tail.stop();
    }
    Ok(outcome)
}

/// Set an app's instance count and wait until that many are running.
///
/// # Errors
///
/// Returns `LaunchError::Scale` if the orchestration service rejects the
/// request.
pub async fn scale_app(
    runner: &impl AppRunner,
    reporter: &impl ProgressReporter,
    name: &str,
    instances: u32,
    timeout: Duration,
) -> Result<PollOutcome> {
    runner
        .scale_app(name, instances)
        .await
        .map_err(|e| LaunchError::Scale {
            instances,
            reason: format!("{e:#}"),
        })?;
    reporter.step(&format!("Scaling {name} to {instances} instances"));

    let outcome = poll_until(
        move || async move {
            match runner.running_instances(name).await {
                Ok(count) if count.running == instances => PollSignal::Converged,
                Ok(_) => PollSignal::Pending,
                Err(e) => {
                    tracing::debug!(app = name, error = %e, "instance query failed");
                    PollSignal::Pending
                }
            }
        },
        timeout,
        reporter,
        true,
    )
    .await;
    Ok(outcome)
}

/// Scale an app to zero instances.
///
/// # Errors
///
/// See [`scale_app`].
pub async fn stop_app(
    runner: &impl AppRunner,
    reporter: &impl ProgressReporter,
    name: &str,
    timeout: Duration,
) -> Result<PollOutcome> {
    scale_app(runner, reporter, name, 0, timeout).await
}

/// Remove an app and wait until the service no longer knows it.
///
/// A failing existence query counts as "still exists".
///
/// # Errors
///
/// Returns `LaunchError::Remove` if the orchestration service rejects the
/// request.
pub async fn remove_app(
    runner: &impl AppRunner,
    reporter: &impl ProgressReporter,
    name: &str,
    timeout: Duration,
) -> Result<PollOutcome> {
    runner
        .remove_app(name)
        .await
        .map_err(|e| LaunchError::Remove(format!("{e:#}")))?;
    reporter.step(&format!("Removing {name}"));

    let outcome = poll_until(
        move || async move {
            match runner.app_exists(name).await {
                Ok(false) => PollSignal::Converged,
                Ok(true) => PollSignal::Pending,
                Err(e) => {
                    tracing::debug!(app = name, error = %e, "existence query failed");
                    PollSignal::Pending
                }
            }
        },
        timeout,
        reporter,
        true,
    )
    .await;
    Ok(outcome)
}
