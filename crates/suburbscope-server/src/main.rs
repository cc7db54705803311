mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

use suburbscope_core::Settings;
use suburbscope_server::{telemetry, ServerError};
use tracing::info;

use crate::cli::{Cli, Command, ServeArgs};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, ServerError> {
    let cli = Cli::parse();

    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            eprintln!("warning: could not load .env: {error}");
        }
    }
    let log_format = telemetry::init();
    info!(log_format = log_format.as_str(), "logging initialized");

    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    match cli.command {
        Some(Command::Resolve(args)) => commands::resolve(settings, args).await,
        Some(Command::Serve(args)) => commands::serve(settings, args).await,
        None => commands::serve(settings, ServeArgs::default()).await,
    }
}
