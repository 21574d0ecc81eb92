//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands::{self, EXIT_INTERRUPTED};

/// Command line interface for Lattice
#[derive(Parser)]
#[command(
    name = "ltc",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a docker app on lattice
    #[command(visible_alias = "s")]
    Start(commands::start::StartArgs),

    /// Scale a docker app on lattice
    Scale(commands::scale::ScaleArgs),

    /// Stop a docker app on lattice
    Stop(commands::stop::StopArgs),

    /// Stop and remove a docker app from lattice
    #[command(visible_alias = "rm")]
    Remove(commands::remove::RemoveArgs),

    /// Stream logs from the specified application
    #[command(visible_alias = "l")]
    Logs(commands::logs::LogsArgs),

    /// Show or set the target lattice domain
    #[command(visible_alias = "t")]
    Target(commands::target::TargetArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// Command failures are printed here and turned into exit codes. Ctrl-C
    /// drops the running command and yields the interrupt code.
    ///
    /// # Errors
    ///
    /// Returns an error only if the application context cannot be built.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            quiet,
            no_color,
            command,
        } = self;
        let app = AppContext::new(&OutputFlags { no_color, quiet })?;

        let result = tokio::select! {
            res = dispatch(command, &app) => res,
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
        };
        Ok(result.unwrap_or_else(|e| commands::report_failure(&app.output, &e)))
    }
}

async fn dispatch(command: Command, app: &AppContext) -> Result<ExitCode> {
    match command {
        Command::Start(args) => commands::start::run(args, app).await,
        Command::Scale(args) => commands::scale::run(args, app).await,
        Command::Stop(args) => commands::stop::run(args, app).await,
        Command::Remove(args) => commands::remove::run(args, app).await,
        Command::Logs(args) => commands::logs::run(args, app).await,
        Command::Target(args) => commands::target::run(args, app),
    }
}
