mod cli;
mod manifest;
mod stages;

use std::process::ExitCode;

use clap::Parser;
use lazymedia_logging::media_error;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    lazymedia_logging::initialize(cli.log.into(), cli.log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            media_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = manifest::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Download { input, output } => stages::run_download(&config, &input, &output).await,
        Command::Build { input, output } => stages::run_build(&config, &input, &output),
    }
}
