use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chaos_demo::{cli::Cli, config::Config, error::AppError, run_command};

/// Exit status after Ctrl-C, as a shell would report it
const INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            match e.downcast_ref::<AppError>() {
                Some(AppError::ExperimentNotFound { .. }) => println!("ERROR: {}", e),
                _ => tracing::error!("{:#}", e),
            }
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    tracing::debug!(?config, "Configuration loaded");

    tokio::select! {
        result = run_command(cli.command, &config) => {
            result?;
            Ok(ExitCode::SUCCESS)
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, leaving any submitted experiment running in the cluster");
            Ok(ExitCode::from(INTERRUPTED))
        }
    }
}
