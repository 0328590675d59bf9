//! Runs one Litmus experiment end to end

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use super::poll::{poll_until, Clock, PollOutcome, PollSettings};
use super::summary::{banner, format_timestamp};
use super::types::{ExperimentDescriptor, ExperimentResult, EXECUTION_SUCCESSFUL};
use crate::config::Config;
use crate::error::AppResult;
use crate::exec::{run_checked, CommandRunner};
use crate::k8s::Kubectl;

/// Status recorded when the experiment never reported completion
pub const TIMED_OUT: &str = "Timed Out";

const ENGINE_STATUS_PATH: &str = "{.status.experiments[0].status}";
const VERDICT_PATH: &str = "{.spec.experimentstatus.verdict}";

/// Submits ChaosEngines and waits for their verdicts
pub struct ExperimentRunner<R, C> {
    runner: R,
    clock: C,
    kubectl: Kubectl,
    experiments_dir: PathBuf,
    scratch_dir: PathBuf,
    poll: PollSettings,
}

impl<R: CommandRunner, C: Clock> ExperimentRunner<R, C> {
    pub fn new(runner: R, clock: C, config: &Config) -> Self {
        Self {
            runner,
            clock,
            kubectl: Kubectl::new(&config.kubectl_bin),
            experiments_dir: config.experiments_dir.clone(),
            scratch_dir: config.scratch_dir.clone(),
            poll: config.poll_settings(),
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn experiments_dir(&self) -> &Path {
        &self.experiments_dir
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn descriptor_path(&self, experiment: &str) -> PathBuf {
        self.experiments_dir.join(format!("{}.yaml", experiment))
    }

    pub async fn load_descriptor(&self, experiment: &str) -> AppResult<ExperimentDescriptor> {
        let path = self.descriptor_path(experiment);
        let yaml = tokio::fs::read_to_string(&path).await?;
        ExperimentDescriptor::from_yaml(&yaml, &path.display().to_string())
    }

    /// Run `experiment` with `RAMP_TIME` set to `delay_secs`
    pub async fn run_experiment(
        &self,
        experiment: &str,
        delay_secs: u64,
    ) -> AppResult<ExperimentResult> {
        println!(
            "{}",
            banner(&format!(
                "{} Experiment: {}",
                format_timestamp(&self.clock.now()),
                experiment
            ))
        );

        let descriptor = self.load_descriptor(experiment).await?;
        let engine = descriptor.name();
        let namespace = descriptor.namespace();
        let file_name = format!("{}.yaml", experiment);

        let patched = descriptor.with_ramp_time(delay_secs)?;
        let scratch = self.write_scratch(experiment, &patched.to_yaml()?)?;

        info!(
            "Running Litmus ChaosEngine Experiment {} in namespace {} with delay {} seconds...",
            file_name, namespace, delay_secs
        );
        info!("Deploying {}...", file_name);

        let stale = self.kubectl.delete_if_exists("chaosengine", engine, namespace);
        if let Err(e) = run_checked(&self.runner, stale).await {
            warn!("Could not remove previous ChaosEngine {}: {}", engine, e);
        }

        let submit = self.kubectl.create_from_file(scratch.path(), Some(namespace));
        if let Err(e) = run_checked(&self.runner, submit).await {
            error!("Failed to submit {}: {}", file_name, e);
            return Err(e);
        }

        let start_time = self.clock.now();
        info!("{} Running experiment...", format_timestamp(&start_time));

        let runner = &self.runner;
        let kubectl = &self.kubectl;
        let fetch = || {
            let cmd = kubectl.get_jsonpath("chaosengine", engine, namespace, ENGINE_STATUS_PATH);
            async move {
                run_checked(runner, cmd)
                    .await
                    .map(|output| output.stdout_line().to_string())
            }
        };
        let outcome = match poll_until(self.poll, fetch, |status| status == EXECUTION_SUCCESSFUL).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Lost track of experiment {}: {}", experiment, e);
                return Err(e);
            }
        };

        remove_scratch(scratch);

        let result_name = descriptor.result_name(experiment);
        let status = match outcome {
            PollOutcome::Completed { polls } => {
                info!("Experiment {} finished after {} status checks", experiment, polls);
                self.print_result_description(&result_name, namespace).await;

                let verdict = kubectl.get_jsonpath("chaosresult", &result_name, namespace, VERDICT_PATH);
                run_checked(runner, verdict).await?.stdout_line().to_string()
            }
            PollOutcome::TimedOut { polls, last_status } => {
                warn!(
                    "Experiment {} did not finish after {} status checks (last status: {})",
                    experiment,
                    polls,
                    last_status.as_deref().unwrap_or("<none>")
                );
                TIMED_OUT.to_string()
            }
        };

        Ok(ExperimentResult {
            name: experiment.to_string(),
            status,
            start_time,
        })
    }

    /// Patched descriptor in a uniquely named file, removed when dropped
    fn write_scratch(&self, experiment: &str, body: &str) -> AppResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("chaosengine-{}-", experiment))
            .suffix(".yaml")
            .tempfile_in(&self.scratch_dir)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    async fn print_result_description(&self, result_name: &str, namespace: &str) {
        let describe = self.kubectl.describe("chaosresult", result_name, namespace);
        println!("\n{}", describe);
        match run_checked(&self.runner, describe).await {
            Ok(output) => println!("{}", output.stdout),
            Err(e) => warn!("Could not describe ChaosResult {}: {}", result_name, e),
        }
    }
}

fn remove_scratch(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}
