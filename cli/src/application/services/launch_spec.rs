//! Application service: turn `ltc start` inputs into a complete `LaunchSpec`.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::Result;

use crate::application::ports::{ImageMetadataFetcher, ProgressReporter};
use crate::domain::env::resolve_environment;
use crate::domain::launch::{DEFAULT_DISK_MB, DEFAULT_MEMORY_MB, DEFAULT_WORKING_DIR};
use crate::domain::route::parse_route_overrides;
use crate::domain::{
    ImageMetadata, ImageReference, LaunchError, LaunchSpec, PortRequest, PortSource,
    RouteOverride, UsageError,
};

/// `ltc start` inputs as typed by the operator.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    /// Start command and arguments given after `--`.
    pub command: Vec<String>,
    pub working_dir: Option<String>,
    pub run_as_root: bool,
    /// `NAME` or `NAME=VALUE` tokens, in flag order.
    pub env: Vec<String>,
    pub memory_mb: u32,
    pub disk_mb: u32,
    pub ports: Option<String>,
    pub monitored_port: Option<u16>,
    pub routes: Option<String>,
    pub instances: u32,
    pub no_monitor: bool,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            name: None,
            image: None,
            command: Vec::new(),
            working_dir: None,
            run_as_root: false,
            env: Vec::new(),
            memory_mb: DEFAULT_MEMORY_MB,
            disk_mb: DEFAULT_DISK_MB,
            ports: None,
            monitored_port: None,
            routes: None,
            instances: 1,
            no_monitor: false,
        }
    }
}

/// A `StartRequest` that passed every check not needing the network.
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub name: String,
    pub image: ImageReference,
    command: Option<(String, Vec<String>)>,
    working_dir: Option<String>,
    privileged: bool,
    env: Vec<String>,
    memory_mb: u32,
    disk_mb: u32,
    ports: PortRequest,
    route_overrides: Vec<RouteOverride>,
    pub instances: u32,
    monitor: bool,
}

/// Validate positional arguments, ports, and routes.
///
/// Runs before any network call.
///
/// # Errors
///
/// Returns a `UsageError` for missing name/image or non-positive limits, and
/// a `ValidationError` for bad `--ports`, `--monitored-port`, or `--routes`.
pub fn prepare(request: StartRequest) -> Result<PreparedLaunch> {
    let StartRequest {
        name,
        image,
        command,
        working_dir,
        run_as_root,
        env,
        memory_mb,
        disk_mb,
        ports,
        monitored_port,
        routes,
        instances,
        no_monitor,
    } = request;

    let (Some(name), Some(image)) = (
        name.filter(|n| !n.is_empty()),
        image.filter(|i| !i.is_empty()),
    ) else {
        return Err(UsageError::new("APP_NAME and DOCKER_IMAGE are required").into());
    };
    if instances == 0 || memory_mb == 0 || disk_mb == 0 {
        return Err(
            UsageError::new("--instances, --memory-mb and --disk-mb must be positive").into(),
        );
    }

    let image = ImageReference::parse(&image)?;
    let ports = PortRequest::parse(ports.as_deref(), monitored_port, no_monitor)?;
    let route_overrides = parse_route_overrides(routes.as_deref().unwrap_or_default())?;

    let mut command = command.into_iter();
    let command = command.next().map(|cmd| (cmd, command.collect()));

    Ok(PreparedLaunch {
        name,
        image,
        command,
        working_dir: working_dir.filter(|w| !w.is_empty()),
        privileged: run_as_root,
        env,
        memory_mb,
        disk_mb,
        ports,
        route_overrides,
        instances,
        monitor: !no_monitor,
    })
}

/// Fetch image metadata and fill every field left open by the flags.
///
/// Precedence per field: explicit flag, then image metadata, then default.
///
/// # Errors
///
/// Returns `LaunchError::MetadataFetch` when the fetch fails and
/// `LaunchError::EmptyStartCommand` when no command was given and the image
/// defines none.
pub async fn resolve_launch_spec(
    fetcher: &impl ImageMetadataFetcher,
    reporter: &impl ProgressReporter,
    prepared: PreparedLaunch,
    process_env: &[String],
) -> Result<LaunchSpec> {
    let metadata = fetcher
        .fetch(&prepared.image)
        .await
        .map_err(|e| LaunchError::MetadataFetch(format!("{e:#}")))?;
    tracing::debug!(image = %prepared.image, ?metadata, "fetched image metadata");

    compose(reporter, prepared, &metadata, process_env)
}

fn compose(
    reporter: &impl ProgressReporter,
    prepared: PreparedLaunch,
    metadata: &ImageMetadata,
    process_env: &[String],
) -> Result<LaunchSpec> {
    let PreparedLaunch {
        name,
        image,
        command,
        working_dir,
        privileged,
        env,
        memory_mb,
        disk_mb,
        ports,
        route_overrides,
        instances,
        monitor,
    } = prepared;

    let (ports, source) = ports.resolve(&metadata.ports);
    match source {
        PortSource::ImageMetadata => {
            let list: Vec<String> = ports.exposed.iter().map(ToString::to_string).collect();
            reporter.step(&format!(
                "No port specified, using exposed ports from the image metadata.\n\
                 \tExposed Ports: {}",
                list.join(", ")
            ));
        }
        PortSource::Default => reporter.step(
            "No port specified, image metadata did not contain exposed ports. Defaulting to 8080.",
        ),
        PortSource::Flags | PortSource::DefaultUnmonitored => {}
    }

    let working_dir = working_dir.unwrap_or_else(|| {
        reporter.step(
            "No working directory specified, \
             using working directory from the image metadata...",
        );
        if metadata.working_dir.is_empty() {
            DEFAULT_WORKING_DIR.to_string()
        } else {
            reporter.step(&format!("Working directory is: {}", metadata.working_dir));
            metadata.working_dir.clone()
        }
    });

    if monitor {
        reporter.step(&format!("Monitoring the app on port {}...", ports.monitored));
    } else {
        reporter.step("No ports will be monitored.");
    }

    let (start_command, args) = match command {
        Some(explicit) => explicit,
        None => {
            reporter.step(
                "No start command specified, \
                 using start command from the image metadata...",
            );
            let Some((cmd, args)) = metadata.start_command.split_first() else {
                return Err(LaunchError::EmptyStartCommand(image.to_string()).into());
            };
            reporter.step(&format!("Start command is: {}", metadata.start_command.join(" ")));
            (cmd.clone(), args.to_vec())
        }
    };

    Ok(LaunchSpec {
        name,
        image,
        start_command,
        args,
        environment: resolve_environment(&env, process_env),
        privileged,
        monitor,
        instances,
        memory_mb,
        disk_mb,
        ports,
        working_dir,
        route_overrides,
    })
}
