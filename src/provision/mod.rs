//! Demo environment lifecycle
//!
//! `start` and `stop` are built as plans (ordered lists of steps) and then
//! executed one step at a time.

mod plan;

pub use plan::*;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::exec::{run_checked, CommandRunner};
use crate::gke::ClusterTarget;
use crate::k8s::{parse_ingress_ip, IngressLookup, Kubectl};

/// Outcome of a plan that ran to the end
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub completed: usize,
    /// Descriptions of best-effort steps that failed
    pub skipped: Vec<String>,
}

/// Run each step in order. A failing `Required` step stops the plan.
pub async fn execute_plan<R>(runner: &R, steps: &[ProvisionStep]) -> AppResult<PlanSummary>
where
    R: CommandRunner + ?Sized,
{
    let mut summary = PlanSummary::default();

    for (i, step) in steps.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, steps.len(), step.description());

        match step {
            ProvisionStep::Wait { duration, .. } => {
                tokio::time::sleep(*duration).await;
            }
            ProvisionStep::Run {
                description,
                command,
                policy,
            } => match run_checked(runner, command.clone()).await {
                Ok(_) => {}
                Err(e) if *policy == StepPolicy::BestEffort => {
                    warn!("{} failed ({} step), continuing: {}", description, policy, e);
                    summary.skipped.push(description.clone());
                    continue;
                }
                Err(e) => {
                    error!("{} failed ({} step): {}", description, policy, e);
                    return Err(e);
                }
            },
        }
        summary.completed += 1;
    }

    Ok(summary)
}

/// Read the demo application's external address
pub async fn lookup_ingress<R>(runner: &R, kubectl: &Kubectl) -> AppResult<IngressLookup>
where
    R: CommandRunner + ?Sized,
{
    let output = run_checked(runner, kubectl.get_json("ingress", INGRESS_NAME, APP_NAMESPACE)).await?;
    parse_ingress_ip(&output.stdout)
}

/// Bring up the GKE cluster with the demo environment deployed
pub async fn start<R>(
    runner: &R,
    config: &Config,
    target: &ClusterTarget,
    auth_token: &str,
) -> AppResult<PlanSummary>
where
    R: CommandRunner + ?Sized,
{
    info!(
        "Starting GKE cluster in project {} with name {} in zone {}",
        target.project, target.name, target.zone
    );

    let summary = execute_plan(runner, &start_plan(target, auth_token, config)).await?;

    let retry = format!(
        "\tkubectl get ingress {} --namespace={}",
        INGRESS_NAME, APP_NAMESPACE
    );
    match lookup_ingress(runner, &Kubectl::new(&config.kubectl_bin)).await {
        Ok(IngressLookup::Ready(ip)) => {
            println!("\nYou can access the web application in a few minutes at: http://{}", ip);
        }
        Ok(IngressLookup::NotYetAvailable) => {
            println!("Ingress still being setup. Use the following command to get the IP later:");
            println!("{}", retry);
        }
        Err(e) => {
            warn!("Could not read ingress address: {}", e);
            println!("Use the following command to get the IP later:");
            println!("{}", retry);
        }
    }

    if !summary.skipped.is_empty() {
        warn!("Steps that did not succeed: {}", summary.skipped.join(", "));
    }
    println!("\nFinished creating cluster. Please wait at least 15 minutes for environment to become fully initialised.");
    println!("The ingress to access the web application from your browser can take at least 5 minutes to create.");

    Ok(summary)
}

/// Shut down the GKE cluster
pub async fn stop<R>(runner: &R, config: &Config, target: &ClusterTarget) -> AppResult<PlanSummary>
where
    R: CommandRunner + ?Sized,
{
    info!(
        "Stopping GKE cluster in project {} with name {} in zone {}",
        target.project, target.name, target.zone
    );
    execute_plan(runner, &stop_plan(target, config)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::exec::{CommandOutput, MockCommandRunner, ToolCommand};
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn step(cmd: &str, policy: StepPolicy) -> ProvisionStep {
        ProvisionStep::Run {
            description: cmd.to_string(),
            command: ToolCommand::new("kubectl").arg(cmd),
            policy,
        }
    }

    /// Fails every command whose first argument is listed in `failing`
    fn runner_failing(failing: &'static [&'static str]) -> (MockCommandRunner, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(move |cmd| {
            log.lock().unwrap().push(cmd.args.first().cloned().unwrap_or_default());
            let output = if failing.iter().any(|f| cmd.args.first().map(String::as_str) == Some(*f)) {
                CommandOutput::failure(1, "Error from server (AlreadyExists)")
            } else {
                CommandOutput::success("")
            };
            async move { Ok(output) }.boxed()
        });
        (mock, seen)
    }

    #[tokio::test]
    async fn test_best_effort_failure_continues() {
        let (mock, seen) = runner_failing(&["second"]);
        let steps = vec![
            step("first", StepPolicy::Required),
            step("second", StepPolicy::BestEffort),
            step("third", StepPolicy::Required),
        ];

        let summary = execute_plan(&mock, &steps).await.unwrap();
        assert_eq!(
            summary,
            PlanSummary {
                completed: 2,
                skipped: vec!["second".to_string()],
            }
        );
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_required_failure_stops_plan() {
        let (mock, seen) = runner_failing(&["second"]);
        let steps = vec![
            step("first", StepPolicy::Required),
            step("second", StepPolicy::Required),
            step("third", StepPolicy::Required),
        ];

        let err = execute_plan(&mock, &steps).await.unwrap_err();
        assert!(matches!(err, AppError::CommandFailed { .. }));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_step_sleeps() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().never();
        let steps = vec![ProvisionStep::Wait {
            description: "settle".to_string(),
            duration: Duration::from_secs(60),
        }];

        let start = tokio::time::Instant::now();
        let summary = execute_plan(&mock, &steps).await.unwrap();
        assert_eq!(summary.completed, 1);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_reports_ingress() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(|cmd| {
            let output = if cmd.has_args_prefix(&["get", "ingress", INGRESS_NAME, "-n"]) && cmd.args.contains(&"json".to_string()) {
                CommandOutput::success(r#"{"status":{"loadBalancer":{"ingress":[{"ip":"35.1.2.3"}]}}}"#)
            } else {
                CommandOutput::success("")
            };
            async move { Ok(output) }.boxed()
        });

        let target = ClusterTarget::new("demo-project");
        let summary = start(&mock, &Config::default(), &target, "token").await.unwrap();
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.completed, start_plan(&target, "token", &Config::default()).len());
    }

    #[tokio::test]
    async fn test_lookup_ingress_not_found_is_an_error() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(|_| {
            async { Ok(CommandOutput::failure(1, "ingresses \"basic-ingress\" not found")) }.boxed()
        });

        let result = lookup_ingress(&mock, &Kubectl::default()).await;
        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
    }
}
