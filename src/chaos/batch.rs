//! Drives one or all experiments in sequence

use std::path::Path;
use std::time::Duration;

use tracing::{error, info};

use super::poll::Clock;
use super::runner::ExperimentRunner;
use super::summary::format_timestamp;
use super::types::{ExperimentResult, ExperimentSelection};
use crate::error::{AppError, AppResult};
use crate::exec::CommandRunner;

/// Results gathered by `run_tests`
#[derive(Debug, Default)]
pub struct TestReport {
    /// One entry per completed experiment, in run order
    pub results: Vec<ExperimentResult>,
    /// Set when an experiment failed and the remaining ones were skipped
    pub aborted: Option<AppError>,
}

/// Experiment names (file stems) of every `*.yaml` descriptor in `dir`, sorted
pub async fn discover_experiments(dir: &Path) -> AppResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(".yaml")) {
            if !stem.is_empty() {
                names.push(stem.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Run the selected experiments.
///
/// Experiments never overlap: in batch mode each one is followed by `wait`
/// before the next starts, so incidents stay apart in downstream monitoring.
pub async fn run_tests<R, C>(
    runner: &ExperimentRunner<R, C>,
    selection: &ExperimentSelection,
    wait: Duration,
    delay_secs: u64,
) -> AppResult<TestReport>
where
    R: CommandRunner,
    C: Clock,
{
    let experiments = discover_experiments(runner.experiments_dir()).await?;

    let queue = match selection {
        ExperimentSelection::All => {
            info!(
                "Running all {} Litmus ChaosEngine Experiments with {} mins wait time between each one...",
                experiments.len(),
                wait.as_secs() / 60
            );
            experiments
        }
        ExperimentSelection::Named(name) => {
            if !experiments.iter().any(|e| e == name) {
                return Err(AppError::ExperimentNotFound {
                    file: format!("{}.yaml", name),
                    dir: runner.experiments_dir().display().to_string(),
                });
            }
            vec![name.clone()]
        }
    };

    let mut report = TestReport::default();
    let total = queue.len();

    for (i, experiment) in queue.iter().enumerate() {
        match runner.run_experiment(experiment, delay_secs).await {
            Ok(result) => report.results.push(result),
            Err(e) => {
                error!("Experiment {} failed, skipping the rest: {}", experiment, e);
                report.aborted = Some(e);
                break;
            }
        }

        if i + 1 < total {
            info!(
                "{} Waiting {} mins before running next experiment...",
                format_timestamp(&runner.clock().now()),
                wait.as_secs() / 60
            );
            tokio::time::sleep(wait).await;
        }
    }

    Ok(report)
}
