//! chaos-demo library
//!
//! Provisions a GKE demo environment and runs Litmus chaos experiments
//! against it by driving `gcloud`, `kubectl` and `helm`.

pub mod chaos;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod gke;
pub mod helm;
pub mod k8s;
pub mod provision;

use std::time::Duration;

use crate::chaos::{render_summary, ExperimentRunner, PollSettings, SystemClock};
use crate::cli::{Command, TestArgs};
use crate::config::Config;
use crate::error::AppResult;
use crate::exec::SystemRunner;
use crate::gke::ClusterTarget;

/// Execute a parsed command against the real tools
pub async fn run_command(command: Command, config: &Config) -> AppResult<()> {
    let runner = SystemRunner::new();

    match command {
        Command::Start(args) => {
            let target = ClusterTarget::from(&args.cluster);
            provision::start(&runner, config, &target, &args.key).await?;
        }
        Command::Stop(args) => {
            provision::stop(&runner, config, &ClusterTarget::from(&args)).await?;
        }
        Command::Test(args) => run_test_command(runner, config, &args).await?,
    }

    Ok(())
}

async fn run_test_command(runner: SystemRunner, config: &Config, args: &TestArgs) -> AppResult<()> {
    let mut poll = config.poll_settings();
    if let Some(timeout) = args.timeout {
        poll = PollSettings {
            deadline: Some(Duration::from_secs(timeout)),
            ..poll
        };
    }
    let experiments = ExperimentRunner::new(runner, SystemClock, config).with_poll_settings(poll);

    let report = chaos::run_tests(
        &experiments,
        &args.test,
        args.wait_duration(),
        args.delay,
    )
    .await?;

    print!("{}", render_summary(&report.results));

    match report.aborted {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
