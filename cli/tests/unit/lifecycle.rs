//! Tests for the start, scale, stop, and remove use-cases.

#![allow(clippy::expect_used)]

use std::time::Duration;

use ltc_cli::application::ports::InstanceCount;
use ltc_cli::application::services::convergence::PollOutcome;
use ltc_cli::application::services::launch_spec::{StartRequest, prepare};
use ltc_cli::application::services::lifecycle::{remove_app, scale_app, start_app, stop_app};
use ltc_cli::domain::LaunchError;
use tokio::time::Instant;

use crate::helpers::{
    RecordingReporter, RecordingTailer, ScriptedRunner, StubFetcher, sample_metadata,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn request(instances: u32) -> StartRequest {
    StartRequest {
        name: Some("cool-web-app".into()),
        image: Some("cloudfoundry/lattice-app".into()),
        instances,
        ..StartRequest::default()
    }
}

// ── scale / stop ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_scale_converges_on_second_evaluation() {
    let runner = ScriptedRunner::new().with_running(&[1, 3]);
    let reporter = RecordingReporter::default();
    let start = Instant::now();

    let outcome = scale_app(&runner, &reporter, "APP", 3, TIMEOUT)
        .await
        .expect("scale");

    assert_eq!(outcome, PollOutcome::Converged);
    assert_eq!(runner.count_queries(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(
        *runner.scaled.lock().expect("lock"),
        vec![("APP".to_string(), 3)]
    );
    assert_eq!(reporter.steps(), vec!["Scaling APP to 3 instances"]);
    assert_eq!(reporter.ticks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scale_times_out_when_count_never_matches() {
    let runner = ScriptedRunner::new().with_running(&[1]);
    let reporter = RecordingReporter::default();

    let outcome = scale_app(&runner, &reporter, "APP", 3, TIMEOUT)
        .await
        .expect("scale");

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(runner.count_queries(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_scale_ignores_placement_failure_and_times_out() {
    let runner = ScriptedRunner::new().with_counts(vec![InstanceCount {
        running: 1,
        placement_failed: true,
    }]);
    let reporter = RecordingReporter::default();

    let outcome = scale_app(&runner, &reporter, "APP", 3, TIMEOUT)
        .await
        .expect("scale");

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(runner.count_queries(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_scale_rejection_is_an_error_and_skips_polling() {
    let runner = ScriptedRunner {
        submit_error: Some("desired LRP not found".into()),
        ..ScriptedRunner::new()
    };
    let reporter = RecordingReporter::default();

    let err = scale_app(&runner, &reporter, "APP", 3, TIMEOUT)
        .await
        .expect_err("rejected");

    let launch = err.downcast_ref::<LaunchError>().expect("launch error");
    assert!(matches!(launch, LaunchError::Scale { instances: 3, .. }));
    assert_eq!(runner.count_queries(), 0);
    assert!(reporter.steps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_scales_to_zero() {
    let runner = ScriptedRunner::new().with_running(&[2, 0]);
    let reporter = RecordingReporter::default();

    let outcome = stop_app(&runner, &reporter, "APP", TIMEOUT)
        .await
        .expect("stop");

    assert!(outcome.is_converged());
    assert_eq!(
        *runner.scaled.lock().expect("lock"),
        vec![("APP".to_string(), 0)]
    );
}

// ── remove ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_remove_treats_query_errors_as_still_existing() {
    let runner = ScriptedRunner::new().with_exists(vec![
        Err("receptor unreachable".into()),
        Ok(true),
        Ok(false),
    ]);
    let reporter = RecordingReporter::default();
    let start = Instant::now();

    let outcome = remove_app(&runner, &reporter, "APP", TIMEOUT)
        .await
        .expect("remove");

    assert_eq!(outcome, PollOutcome::Converged);
    assert_eq!(runner.exists_queries(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(*runner.removed.lock().expect("lock"), vec!["APP".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_remove_times_out_while_app_persists() {
    let runner = ScriptedRunner::new().with_exists(vec![Ok(true)]);
    let reporter = RecordingReporter::default();

    let outcome = remove_app(&runner, &reporter, "APP", TIMEOUT)
        .await
        .expect("remove");

    assert_eq!(outcome, PollOutcome::TimedOut);
}

// ── start ────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_start_submits_polls_and_stops_tail_once() {
    let runner = ScriptedRunner::new().with_running(&[0, 1, 2]);
    let fetcher = StubFetcher::returning(sample_metadata());
    let tailer = RecordingTailer::new();
    let reporter = RecordingReporter::default();

    let outcome = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(2)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect("start");

    assert_eq!(outcome, PollOutcome::Converged);
    assert_eq!(runner.count_queries(), 3);
    assert_eq!(tailer.tailed(), vec!["cool-web-app".to_string()]);
    assert_eq!(tailer.stopped(), 1);

    let started = runner.started.lock().expect("lock");
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].name, "cool-web-app");
    assert_eq!(started[0].instances, 2);
    assert_eq!(started[0].start_command, "/lattice-app");
    assert!(reporter.steps().contains(&"Starting App: cool-web-app".to_string()));
    // Start shows no progress dots.
    assert_eq!(reporter.ticks(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_reports_placement_failure_and_still_stops_tail() {
    let runner = ScriptedRunner::new().with_counts(vec![InstanceCount {
        running: 0,
        placement_failed: true,
    }]);
    let fetcher = StubFetcher::returning(sample_metadata());
    let tailer = RecordingTailer::new();
    let reporter = RecordingReporter::default();
    let start = Instant::now();

    let outcome = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(1)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect("start");

    assert_eq!(outcome, PollOutcome::PlacementFailed);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(tailer.stopped(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_times_out_and_stops_tail() {
    let runner = ScriptedRunner::new().with_running(&[0]);
    let fetcher = StubFetcher::returning(sample_metadata());
    let tailer = RecordingTailer::new();
    let reporter = RecordingReporter::default();

    let outcome = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(1)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect("start");

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(tailer.stopped(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_rejection_skips_tail_and_polling() {
    let runner = ScriptedRunner {
        start_error: Some("cool-web-app is already running".into()),
        ..ScriptedRunner::new()
    };
    let fetcher = StubFetcher::returning(sample_metadata());
    let tailer = RecordingTailer::new();
    let reporter = RecordingReporter::default();

    let err = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(1)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect_err("rejected");

    assert_eq!(
        err.to_string(),
        "Error Starting App: cool-web-app is already running"
    );
    assert_eq!(runner.count_queries(), 0);
    assert!(tailer.tailed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_metadata_failure_submits_nothing() {
    let runner = ScriptedRunner::new();
    let fetcher = StubFetcher::failing();
    let tailer = RecordingTailer::new();
    let reporter = RecordingReporter::default();

    let err = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(1)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect_err("fetch failed");

    assert!(matches!(
        err.downcast_ref::<LaunchError>(),
        Some(LaunchError::MetadataFetch(_))
    ));
    assert!(runner.started.lock().expect("lock").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_continues_without_log_tail() {
    let runner = ScriptedRunner::new().with_running(&[1]);
    let fetcher = StubFetcher::returning(sample_metadata());
    let tailer = RecordingTailer::failing();
    let reporter = RecordingReporter::default();

    let outcome = start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepare(request(1)).expect("prepare"),
        &[],
        TIMEOUT,
    )
    .await
    .expect("start");

    assert!(outcome.is_converged());
}
