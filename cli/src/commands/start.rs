//! `ltc start`: launch a docker image as a new app.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::convergence::PollOutcome;
use crate::application::services::launch_spec::{self, StartRequest};
use crate::application::services::lifecycle;
use crate::commands::{EXIT_FAILURE, EXIT_PLACEMENT_FAILED};
use crate::domain::config::app_url;
use crate::domain::launch::{DEFAULT_DISK_MB, DEFAULT_MEMORY_MB};

/// Arguments for the start command.
#[derive(Args)]
pub struct StartArgs {
    /// Name of the app
    pub name: Option<String>,

    /// Docker image, e.g. `cloudfoundry/lattice-app:latest`
    pub image: Option<String>,

    /// Working directory to run the start command in
    #[arg(short = 'w', long)]
    pub working_dir: Option<String>,

    /// Run the app as root
    #[arg(short = 'r', long)]
    pub run_as_root: bool,

    /// Environment variable `NAME=VALUE`; `NAME` alone copies it from this shell
    #[arg(short = 'e', long = "env", value_name = "NAME[=VALUE]")]
    pub env: Vec<String>,

    /// Memory limit in MB
    #[arg(short = 'm', long, default_value_t = DEFAULT_MEMORY_MB)]
    pub memory_mb: u32,

    /// Disk limit in MB
    #[arg(short = 'd', long, default_value_t = DEFAULT_DISK_MB)]
    pub disk_mb: u32,

    /// Comma-separated ports the app listens on, e.g. `8080,9090`
    #[arg(short = 'p', long)]
    pub ports: Option<String>,

    /// Port to health-check; required with more than one `--ports` entry
    #[arg(long)]
    pub monitored_port: Option<u16>,

    /// Route overrides as `PORT:HOSTNAME_PREFIX,...`
    #[arg(long)]
    pub routes: Option<String>,

    /// Number of instances to run
    #[arg(long, default_value_t = 1)]
    pub instances: u32,

    /// Disable health monitoring
    #[arg(long)]
    pub no_monitor: bool,

    /// Start command and its arguments
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl From<StartArgs> for StartRequest {
    fn from(args: StartArgs) -> Self {
        Self {
            name: args.name,
            image: args.image,
            command: args.command,
            working_dir: args.working_dir,
            run_as_root: args.run_as_root,
            env: args.env,
            memory_mb: args.memory_mb,
            disk_mb: args.disk_mb,
            ports: args.ports,
            monitored_port: args.monitored_port,
            routes: args.routes,
            instances: args.instances,
            no_monitor: args.no_monitor,
        }
    }
}

/// Run `ltc start`.
///
/// # Errors
///
/// Returns an error on bad arguments, missing target, unreadable image
/// metadata, or a rejected submission.
pub async fn run(args: StartArgs, app: &AppContext) -> Result<ExitCode> {
    let prepared = launch_spec::prepare(args.into())?;
    let target = app.config.require_target()?;
    let runner = app.runner()?;
    let fetcher = app.fetcher()?;
    let tailer = app.tailer()?;
    let reporter = app.reporter();
    let name = prepared.name.clone();

    let outcome = lifecycle::start_app(
        &fetcher,
        &runner,
        &tailer,
        &reporter,
        prepared,
        &process_env(),
        app.timeout,
    )
    .await?;

    let ctx = &app.output;
    match outcome {
        PollOutcome::Converged => {
            ctx.success(&format!("{name} is now running."));
            ctx.say(&app_url(&name, target));
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::PlacementFailed => {
            ctx.error(
                "Error, could not place all instances: insufficient resources. \
                 Try requesting fewer instances or reducing the requested memory or disk capacity.",
            );
            Ok(ExitCode::from(EXIT_PLACEMENT_FAILED))
        }
        PollOutcome::TimedOut => {
            ctx.error(&format!("{name} took too long to start."));
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

/// This process's environment as `NAME=VALUE` entries.
fn process_env() -> Vec<String> {
    std::env::vars_os()
        .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
        .collect()
}
