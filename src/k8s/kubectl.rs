//! `kubectl` command builders

use std::path::Path;

use crate::exec::ToolCommand;

/// Builds `kubectl` invocations
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

impl Kubectl {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(&self.binary)
    }

    /// `kubectl get nodes`, streamed to the terminal
    pub fn get_nodes(&self) -> ToolCommand {
        self.command().args(["get", "nodes"]).inherit_output()
    }

    pub fn create_namespace(&self, namespace: &str) -> ToolCommand {
        self.command().args(["create", "namespace", namespace])
    }

    /// `kubectl create -f <source> [-n <namespace>]`; `source` may be a path or URL
    pub fn create_from(&self, source: &str, namespace: Option<&str>) -> ToolCommand {
        let cmd = self.command().args(["create", "-f", source]);
        match namespace {
            Some(ns) => cmd.args(["-n", ns]),
            None => cmd,
        }
    }

    pub fn create_from_file(&self, path: &Path, namespace: Option<&str>) -> ToolCommand {
        self.create_from(&path.display().to_string(), namespace)
    }

    pub fn apply_from(&self, source: &str) -> ToolCommand {
        self.command().args(["apply", "-f", source])
    }

    /// Delete a resource, succeeding when it does not exist
    pub fn delete_if_exists(&self, kind: &str, name: &str, namespace: &str) -> ToolCommand {
        self.command()
            .args(["delete", kind, name, "-n", namespace, "--ignore-not-found"])
    }

    /// Read a single field with a JSONPath expression such as `{.status.phase}`
    pub fn get_jsonpath(&self, kind: &str, name: &str, namespace: &str, path: &str) -> ToolCommand {
        self.command()
            .args(["get", kind, name, "-n", namespace, "-o"])
            .arg(format!("jsonpath={}", path))
    }

    pub fn get_json(&self, kind: &str, name: &str, namespace: &str) -> ToolCommand {
        self.command()
            .args(["get", kind, name, "-n", namespace, "-o", "json"])
    }

    /// Human-readable listing of a single resource, streamed to the terminal
    pub fn get(&self, kind: &str, name: &str, namespace: &str) -> ToolCommand {
        self.command()
            .args(["get", kind, name, "-n", namespace])
            .inherit_output()
    }

    pub fn describe(&self, kind: &str, name: &str, namespace: &str) -> ToolCommand {
        self.command().args(["describe", kind, name, "-n", namespace])
    }

    pub fn annotate(&self, resource: &str, annotation: &str, namespace: &str) -> ToolCommand {
        self.command()
            .args(["annotate", resource, annotation, "-n", namespace])
    }
}
