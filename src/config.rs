use std::path::PathBuf;
use std::time::Duration;

use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;

use crate::chaos::PollSettings;
use crate::error::AppResult;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one ChaosEngine descriptor per experiment
    #[serde(default = "default_experiments_dir")]
    pub experiments_dir: PathBuf,

    /// Directory holding the demo application manifests
    #[serde(default = "default_deploy_dir")]
    pub deploy_dir: PathBuf,

    /// Where the patched descriptor is written before submission
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    #[serde(default = "default_kubectl_bin")]
    pub kubectl_bin: String,

    #[serde(default = "default_helm_bin")]
    pub helm_bin: String,

    #[serde(default = "default_gcloud_bin")]
    pub gcloud_bin: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Unset means wait for the experiment indefinitely
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Pause after cluster creation before installing anything
    #[serde(default = "default_cluster_settle_secs")]
    pub cluster_settle_secs: u64,

    #[serde(default = "default_collector_deployment")]
    pub collector_deployment: String,

    #[serde(default = "default_collector_url")]
    pub collector_url: String,
}

fn default_experiments_dir() -> PathBuf {
    PathBuf::from("./litmus")
}

fn default_deploy_dir() -> PathBuf {
    PathBuf::from("./deploy")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_kubectl_bin() -> String {
    "kubectl".to_string()
}

fn default_helm_bin() -> String {
    "helm".to_string()
}

fn default_gcloud_bin() -> String {
    "gcloud".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_cluster_settle_secs() -> u64 {
    60
}

fn default_collector_deployment() -> String {
    "zebrium-k8s-demo".to_string()
}

fn default_collector_url() -> String {
    "https://zapi03.zebrium.com".to_string()
}

impl Config {
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_builder(
            config::Config::builder()
                .add_source(config::Environment::with_prefix("CHAOS_DEMO").try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> AppResult<Self> {
        let settings: Config = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            deadline: self.poll_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn cluster_settle(&self) -> Duration {
        Duration::from_secs(self.cluster_settle_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            experiments_dir: default_experiments_dir(),
            deploy_dir: default_deploy_dir(),
            scratch_dir: default_scratch_dir(),
            kubectl_bin: default_kubectl_bin(),
            helm_bin: default_helm_bin(),
            gcloud_bin: default_gcloud_bin(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: None,
            cluster_settle_secs: default_cluster_settle_secs(),
            collector_deployment: default_collector_deployment(),
            collector_url: default_collector_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.experiments_dir, PathBuf::from("./litmus"));
        assert_eq!(config.kubectl_bin, "kubectl");
        assert_eq!(config.collector_url, "https://zapi03.zebrium.com");

        let poll = config.poll_settings();
        assert_eq!(poll.interval, Duration::from_secs(10));
        assert_eq!(poll.deadline, None);
        assert_eq!(config.cluster_settle(), Duration::from_secs(60));
    }

    #[test]
    fn test_empty_source_deserializes_to_defaults() {
        let config = Config::from_builder(config::Config::builder()).unwrap();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.collector_deployment, "zebrium-k8s-demo");
    }

    #[test]
    fn test_malformed_value_is_config_error() {
        let builder = config::Config::builder()
            .set_override("poll_interval_secs", "ten")
            .unwrap();
        let err = Config::from_builder(builder).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
