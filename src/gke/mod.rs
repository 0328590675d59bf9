//! Google Kubernetes Engine cluster lifecycle via the `gcloud` CLI

use crate::exec::ToolCommand;

pub const DEFAULT_ZONE: &str = "us-central1-a";
pub const DEFAULT_CLUSTER_NAME: &str = "zebrium-k8s-demo";

/// Which GKE cluster an operation applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTarget {
    pub project: String,
    pub zone: String,
    pub name: String,
}

impl ClusterTarget {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            zone: DEFAULT_ZONE.to_string(),
            name: DEFAULT_CLUSTER_NAME.to_string(),
        }
    }
}

/// Builds `gcloud` invocations
#[derive(Debug, Clone)]
pub struct Gcloud {
    binary: String,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new("gcloud")
    }
}

impl Gcloud {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(&self.binary)
    }

    /// Interactive; may prompt before installing updates
    pub fn components_update(&self) -> ToolCommand {
        self.command().args(["components", "update"]).inherit_output()
    }

    pub fn set_project(&self, target: &ClusterTarget) -> ToolCommand {
        self.command()
            .args(["config", "set", "project", &target.project])
            .inherit_output()
    }

    pub fn create_cluster(&self, target: &ClusterTarget) -> ToolCommand {
        self.cluster_command("create", target)
    }

    /// Writes kubectl credentials for the cluster into the local kubeconfig
    pub fn get_credentials(&self, target: &ClusterTarget) -> ToolCommand {
        self.cluster_command("get-credentials", target)
    }

    /// Interactive; gcloud asks for confirmation
    pub fn delete_cluster(&self, target: &ClusterTarget) -> ToolCommand {
        self.cluster_command("delete", target)
    }

    fn cluster_command(&self, verb: &str, target: &ClusterTarget) -> ToolCommand {
        self.command()
            .args(["container", "clusters", verb, &target.name])
            .args(["--zone", &target.zone, "--project", &target.project])
            .inherit_output()
    }
}
