use crate::exec::ToolCommand;

/// Options for `helm install`
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Chart repository URL, passed as `--repo`
    pub repo: Option<String>,
    /// `key=value` overrides, joined into a single `--set`
    pub set_values: Vec<(String, String)>,
    /// Values contain credentials
    pub sensitive: bool,
}

/// Builds Helm CLI invocations
#[derive(Debug, Clone)]
pub struct HelmClient {
    binary: String,
}

impl Default for HelmClient {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmClient {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Install a chart as `release_name` into `namespace`
    pub fn install(
        &self,
        release_name: &str,
        chart: &str,
        namespace: &str,
        options: &InstallOptions,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.binary)
            .arg("install")
            .arg(release_name)
            .arg("--namespace")
            .arg(namespace);

        if !options.set_values.is_empty() {
            let values = options
                .set_values
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            cmd = cmd.arg("--set").arg(values);
        }

        if let Some(repo) = &options.repo {
            cmd = cmd.arg("--repo").arg(repo);
        }

        let cmd = cmd.arg(chart);
        if options.sensitive {
            cmd.sensitive()
        } else {
            cmd
        }
    }

    pub fn repo_add(&self, name: &str, url: &str) -> ToolCommand {
        ToolCommand::new(&self.binary).args(["repo", "add", name, url])
    }

    pub fn repo_update(&self) -> ToolCommand {
        ToolCommand::new(&self.binary).args(["repo", "update"])
    }
}
