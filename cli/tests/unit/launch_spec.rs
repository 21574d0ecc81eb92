//! Tests for launch-spec resolution: flag validation and precedence of
//! flags over image metadata over defaults.

#![allow(clippy::expect_used)]

use ltc_cli::application::services::launch_spec::{StartRequest, prepare, resolve_launch_spec};
use ltc_cli::domain::{
    ImageMetadata, LaunchError, LaunchSpec, PortConfig, RouteOverride, UsageError, ValidationError,
};

use crate::helpers::{RecordingReporter, StubFetcher, sample_metadata};

fn request() -> StartRequest {
    StartRequest {
        name: Some("cool-web-app".into()),
        image: Some("superfun/app:mytag".into()),
        ..StartRequest::default()
    }
}

async fn resolve(
    req: StartRequest,
    metadata: ImageMetadata,
    process_env: &[String],
) -> (LaunchSpec, Vec<String>) {
    let fetcher = StubFetcher::returning(metadata);
    let reporter = RecordingReporter::default();
    let spec = resolve_launch_spec(&fetcher, &reporter, prepare(req).expect("prepare"), process_env)
        .await
        .expect("resolve");
    (spec, reporter.steps())
}

// ── prepare ──────────────────────────────────────────────────────────────────

#[test]
fn test_prepare_requires_name_and_image() {
    for req in [
        StartRequest::default(),
        StartRequest {
            image: None,
            ..request()
        },
        StartRequest {
            name: Some(String::new()),
            ..request()
        },
    ] {
        let err = prepare(req).expect_err("usage");
        let usage = err.downcast_ref::<UsageError>().expect("usage error");
        assert_eq!(usage.0, "APP_NAME and DOCKER_IMAGE are required");
    }
}

#[test]
fn test_prepare_rejects_zero_instances() {
    let err = prepare(StartRequest {
        instances: 0,
        ..request()
    })
    .expect_err("usage");
    assert!(err.downcast_ref::<UsageError>().is_some());
}

#[test]
fn test_prepare_rejects_bad_ports_and_routes() {
    let err = prepare(StartRequest {
        ports: Some("70000".into()),
        ..request()
    })
    .expect_err("invalid port");
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::InvalidPort)
    );

    let err = prepare(StartRequest {
        ports: Some("8080,9090".into()),
        ..request()
    })
    .expect_err("missing monitored");
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingMonitoredPort)
    );

    let err = prepare(StartRequest {
        routes: Some("bogus".into()),
        ..request()
    })
    .expect_err("malformed route");
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MalformedRoute)
    );
}

// ── resolve_launch_spec ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_metadata_fills_command_working_dir_and_ports() {
    let (spec, steps) = resolve(request(), sample_metadata(), &[]).await;

    assert_eq!(spec.start_command, "/lattice-app");
    assert_eq!(spec.args, vec!["--message", "hi"]);
    assert_eq!(spec.working_dir, "/home/app");
    assert_eq!(spec.ports, PortConfig { monitored: 8080, exposed: vec![8080] });
    assert_eq!(spec.memory_mb, 128);
    assert_eq!(spec.disk_mb, 1024);
    assert_eq!(spec.instances, 1);
    assert!(spec.monitor);
    assert_eq!(spec.image.rootfs(), "docker:///superfun/app#mytag");
    assert!(steps.contains(
        &"No port specified, using exposed ports from the image metadata.\n\tExposed Ports: 8080"
            .to_string()
    ));
    assert!(steps.contains(&"Working directory is: /home/app".to_string()));
    assert!(steps.contains(&"Start command is: /lattice-app --message hi".to_string()));
}

#[tokio::test]
async fn test_flags_win_over_metadata() {
    let req = StartRequest {
        command: vec!["/start-me-please".into(), "AppArg0".into()],
        working_dir: Some("/app".into()),
        ports: Some("2000,4000".into()),
        monitored_port: Some(4000),
        routes: Some("4000:foo".into()),
        env: vec!["TIMEZONE=CST".into()],
        run_as_root: true,
        memory_mb: 12,
        disk_mb: 12,
        instances: 22,
        ..request()
    };
    let (spec, steps) = resolve(req, sample_metadata(), &[]).await;

    assert_eq!(spec.start_command, "/start-me-please");
    assert_eq!(spec.args, vec!["AppArg0"]);
    assert_eq!(spec.working_dir, "/app");
    assert_eq!(spec.ports, PortConfig { monitored: 4000, exposed: vec![2000, 4000] });
    assert_eq!(
        spec.route_overrides,
        vec![RouteOverride { hostname_prefix: "foo".into(), port: 4000 }]
    );
    assert_eq!(spec.environment.get("TIMEZONE").map(String::as_str), Some("CST"));
    assert!(spec.privileged);
    assert_eq!(spec.instances, 22);
    assert_eq!(steps, vec!["Monitoring the app on port 4000..."]);
}

#[tokio::test]
async fn test_defaults_when_metadata_is_bare() {
    let metadata = ImageMetadata {
        start_command: vec!["/run".into()],
        ..ImageMetadata::default()
    };
    let (spec, steps) = resolve(request(), metadata, &[]).await;

    assert_eq!(spec.working_dir, "/");
    assert_eq!(spec.ports, PortConfig { monitored: 8080, exposed: vec![8080] });
    assert!(steps.contains(
        &"No port specified, image metadata did not contain exposed ports. Defaulting to 8080."
            .to_string()
    ));
}

#[tokio::test]
async fn test_no_monitor_without_ports_exposes_8080_unmonitored() {
    let req = StartRequest {
        no_monitor: true,
        ..request()
    };
    let metadata = ImageMetadata {
        start_command: vec!["/run".into()],
        ..ImageMetadata::default()
    };
    let (spec, steps) = resolve(req, metadata, &[]).await;

    assert!(!spec.monitor);
    assert_eq!(spec.ports, PortConfig { monitored: 0, exposed: vec![8080] });
    assert_eq!(spec.primary_port(), 8080);
    assert!(steps.contains(&"No ports will be monitored.".to_string()));
}

#[tokio::test]
async fn test_env_falls_back_to_process_environment() {
    let req = StartRequest {
        env: vec!["FOO=BAR".into(), "BAZ".into()],
        ..request()
    };
    let (spec, _) = resolve(req, sample_metadata(), &["BAZ=WIBBLE".to_string()]).await;

    assert_eq!(spec.environment.get("FOO").map(String::as_str), Some("BAR"));
    assert_eq!(spec.environment.get("BAZ").map(String::as_str), Some("WIBBLE"));
}

#[tokio::test]
async fn test_empty_metadata_command_is_an_error() {
    let fetcher = StubFetcher::returning(ImageMetadata::default());
    let reporter = RecordingReporter::default();

    let err = resolve_launch_spec(&fetcher, &reporter, prepare(request()).expect("prepare"), &[])
        .await
        .expect_err("no command");

    assert!(matches!(
        err.downcast_ref::<LaunchError>(),
        Some(LaunchError::EmptyStartCommand(_))
    ));
}
