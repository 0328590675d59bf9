//! Ordered provisioning steps for the demo environment

use std::time::Duration;

use crate::config::Config;
use crate::exec::ToolCommand;
use crate::gke::{ClusterTarget, Gcloud};
use crate::helm::{HelmClient, InstallOptions};
use crate::k8s::Kubectl;

pub const COLLECTOR_NAMESPACE: &str = "zebrium";
pub const COLLECTOR_RELEASE: &str = "zlog-collector";
pub const COLLECTOR_CHART_REPO: &str =
    "https://raw.githubusercontent.com/zebrium/ze-kubernetes-collector/master/charts";

pub const KAFKA_NAMESPACE: &str = "kafka";
pub const KAFKA_RELEASE: &str = "kafka-cluster";
pub const CONFLUENT_REPO_NAME: &str = "confluentinc";
pub const CONFLUENT_REPO_URL: &str = "https://confluentinc.github.io/cp-helm-charts/";
pub const KAFKA_CHART: &str = "confluentinc/cp-helm-charts";

pub const LITMUS_OPERATOR_URL: &str = "https://litmuschaos.github.io/pages/litmus-operator-v1.0.0.yaml";
pub const GENERIC_EXPERIMENTS_URL: &str =
    "https://hub.litmuschaos.io/api/chaos?file=charts/generic/experiments.yaml";
pub const KAFKA_EXPERIMENTS_URL: &str =
    "https://hub.litmuschaos.io/api/chaos?file=charts/kafka/experiments.yaml";

pub const APP_NAMESPACE: &str = "sock-shop";
pub const INGRESS_NAME: &str = "basic-ingress";

/// What happens to the rest of a plan when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StepPolicy {
    /// Later steps depend on this one; stop the plan
    Required,
    /// Log the failure and carry on (e.g. namespace already exists)
    BestEffort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionStep {
    Run {
        description: String,
        command: ToolCommand,
        policy: StepPolicy,
    },
    Wait {
        description: String,
        duration: Duration,
    },
}

impl ProvisionStep {
    fn run(description: &str, command: ToolCommand, policy: StepPolicy) -> Self {
        ProvisionStep::Run {
            description: description.to_string(),
            command,
            policy,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ProvisionStep::Run { description, .. } | ProvisionStep::Wait { description, .. } => {
                description
            }
        }
    }
}

struct Tools {
    gcloud: Gcloud,
    kubectl: Kubectl,
    helm: HelmClient,
}

impl Tools {
    fn from_config(config: &Config) -> Self {
        Self {
            gcloud: Gcloud::new(&config.gcloud_bin),
            kubectl: Kubectl::new(&config.kubectl_bin),
            helm: HelmClient::new(&config.helm_bin),
        }
    }
}

/// Create the cluster and install the collector, demo apps and Litmus
pub fn start_plan(target: &ClusterTarget, auth_token: &str, config: &Config) -> Vec<ProvisionStep> {
    use StepPolicy::{BestEffort, Required};

    let Tools {
        gcloud,
        kubectl,
        helm,
    } = Tools::from_config(config);
    let manifest = |file: &str| config.deploy_dir.join(file);

    let collector = InstallOptions {
        repo: Some(COLLECTOR_CHART_REPO.to_string()),
        set_values: vec![
            ("zebrium.deployment".to_string(), config.collector_deployment.clone()),
            ("zebrium.collectorUrl".to_string(), config.collector_url.clone()),
            ("zebrium.authToken".to_string(), auth_token.to_string()),
        ],
        sensitive: true,
    };

    vec![
        ProvisionStep::run("Update gcloud components", gcloud.components_update(), BestEffort),
        ProvisionStep::run("Select GCloud project", gcloud.set_project(target), Required),
        ProvisionStep::run("Create GKE cluster", gcloud.create_cluster(target), Required),
        ProvisionStep::run("Fetch kubectl credentials", gcloud.get_credentials(target), Required),
        ProvisionStep::run("List cluster nodes", kubectl.get_nodes(), BestEffort),
        ProvisionStep::Wait {
            description: "Wait for the cluster to finish setting up".to_string(),
            duration: config.cluster_settle(),
        },
        ProvisionStep::run(
            "Create collector namespace",
            kubectl.create_namespace(COLLECTOR_NAMESPACE),
            BestEffort,
        ),
        ProvisionStep::run(
            "Install log collector",
            helm.install(COLLECTOR_RELEASE, COLLECTOR_RELEASE, COLLECTOR_NAMESPACE, &collector),
            Required,
        ),
        ProvisionStep::run(
            "Deploy sock-shop",
            kubectl.create_from_file(&manifest("sock-shop.yaml"), None),
            Required,
        ),
        ProvisionStep::run(
            "Deploy random-log-counter",
            kubectl.create_from_file(&manifest("random-log-counter.yaml"), None),
            BestEffort,
        ),
        ProvisionStep::run(
            "Create kafka namespace",
            kubectl.create_namespace(KAFKA_NAMESPACE),
            BestEffort,
        ),
        ProvisionStep::run(
            "Add Confluent chart repository",
            helm.repo_add(CONFLUENT_REPO_NAME, CONFLUENT_REPO_URL),
            BestEffort,
        ),
        ProvisionStep::run("Update chart repositories", helm.repo_update(), BestEffort),
        ProvisionStep::run(
            "Install Kafka",
            helm.install(KAFKA_RELEASE, KAFKA_CHART, KAFKA_NAMESPACE, &InstallOptions::default()),
            BestEffort,
        ),
        ProvisionStep::run(
            "Mark Kafka as a chaos target",
            kubectl.annotate(
                "sts/kafka-cluster-cp-kafka",
                "litmuschaos.io/chaos=true",
                KAFKA_NAMESPACE,
            ),
            BestEffort,
        ),
        ProvisionStep::run(
            "Install Litmus operator",
            kubectl.apply_from(LITMUS_OPERATOR_URL),
            Required,
        ),
        ProvisionStep::run(
            "Install generic Litmus experiments",
            kubectl.create_from(GENERIC_EXPERIMENTS_URL, Some(APP_NAMESPACE)),
            Required,
        ),
        ProvisionStep::run(
            "Install Kafka Litmus experiments",
            kubectl.create_from(KAFKA_EXPERIMENTS_URL, Some(KAFKA_NAMESPACE)),
            BestEffort,
        ),
        ProvisionStep::run(
            "Create chaos service account",
            kubectl.create_from_file(&manifest("litmus-rbac.yaml"), None),
            Required,
        ),
        ProvisionStep::run(
            "Show ingress",
            kubectl.get("ingress", INGRESS_NAME, APP_NAMESPACE),
            BestEffort,
        ),
    ]
}

/// Delete the cluster
pub fn stop_plan(target: &ClusterTarget, config: &Config) -> Vec<ProvisionStep> {
    let gcloud = Gcloud::new(&config.gcloud_bin);
    vec![
        ProvisionStep::run("Select GCloud project", gcloud.set_project(target), StepPolicy::Required),
        ProvisionStep::run("Delete GKE cluster", gcloud.delete_cluster(target), StepPolicy::Required),
    ]
}
