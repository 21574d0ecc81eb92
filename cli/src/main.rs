//! ltc - command line interface for Lattice

use std::process::ExitCode;

use clap::Parser;
use ltc_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    ltc_cli::infra::logging::init();
    let cli = Cli::parse();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
