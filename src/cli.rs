use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::chaos::ExperimentSelection;
use crate::gke::{ClusterTarget, DEFAULT_CLUSTER_NAME, DEFAULT_ZONE};

#[derive(Debug, Parser)]
#[command(about = "Spin up a demo environment on Kubernetes and run chaos experiments against it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a GKE cluster with the demo environment deployed
    Start(StartArgs),
    /// Shut down the GKE cluster
    Stop(ClusterArgs),
    /// Run Litmus ChaosEngine experiments inside the demo environment
    Test(TestArgs),
}

#[derive(Debug, Args)]
pub struct ClusterArgs {
    /// GCloud project the cluster lives in
    #[arg(short, long)]
    pub project: String,

    /// GCloud zone the cluster lives in
    #[arg(short, long, default_value = DEFAULT_ZONE)]
    pub zone: String,

    /// GKE cluster name
    #[arg(short, long, default_value = DEFAULT_CLUSTER_NAME)]
    pub name: String,
}

impl From<&ClusterArgs> for ClusterTarget {
    fn from(args: &ClusterArgs) -> Self {
        ClusterTarget {
            project: args.project.clone(),
            zone: args.zone.clone(),
            name: args.name.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Collector auth key for the demo account
    #[arg(short, long, env = "ZE_COLLECTOR_KEY", hide_env_values = true)]
    pub key: String,
}

#[derive(Debug, Args)]
pub struct TestArgs {
    /// Experiment to run, named after its yaml file in the experiments directory.
    ///
    /// '*' runs all of them with the wait time between each one.
    #[arg(short, long, default_value = "*")]
    pub test: ExperimentSelection,

    /// Minutes to wait between experiments, so incidents are not clustered together
    #[arg(short, long, default_value_t = 15)]
    pub wait: u64,

    /// Seconds between setting up an experiment and injecting the fault
    #[arg(short, long, default_value_t = 660)]
    pub delay: u64,

    /// Give up on an experiment after this many seconds (default: wait forever)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl TestArgs {
    /// Pause between experiments
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait.saturating_mul(60))
    }
}
