//! Litmus ChaosEngine descriptors and experiment results

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{AppError, AppResult};

/// Parameter name Litmus uses to delay fault injection after setup
pub const RAMP_TIME: &str = "RAMP_TIME";

/// Status a ChaosEngine reports once its experiment has run to completion
pub const EXECUTION_SUCCESSFUL: &str = "Execution Successful";

/// A `{name, value}` entry in an experiment's component list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub value: String,
}

impl Component {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A ChaosEngine manifest read from the experiments directory
///
/// Only the fields the runner needs are extracted; the rest of the document
/// is carried untouched so it can be written back out for submission.
#[derive(Debug, Clone)]
pub struct ExperimentDescriptor {
    name: String,
    namespace: String,
    document: Value,
}

impl ExperimentDescriptor {
    /// Parse a descriptor. `origin` names the source in error messages.
    pub fn from_yaml(yaml: &str, origin: &str) -> AppResult<Self> {
        let document: Value = serde_yaml::from_str(yaml)?;
        let invalid = |reason: &str| AppError::InvalidDescriptor {
            path: origin.to_string(),
            reason: reason.to_string(),
        };

        let metadata = document
            .get("metadata")
            .ok_or_else(|| invalid("missing metadata"))?;
        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing metadata.name"))?
            .to_string();
        let namespace = metadata
            .get("namespace")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing metadata.namespace"))?
            .to_string();

        let descriptor = Self {
            name,
            namespace,
            document,
        };
        // Fail now rather than after the cluster has been touched
        descriptor
            .components_seq()
            .ok_or_else(|| invalid("missing spec.experiments[0].spec.components"))?;

        Ok(descriptor)
    }

    /// ChaosEngine resource name (`metadata.name`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name of the ChaosResult the operator writes for `experiment`
    pub fn result_name(&self, experiment: &str) -> String {
        format!("{}-{}", self.name, experiment)
    }

    /// Components of the first experiment, in document order
    pub fn components(&self) -> Vec<Component> {
        self.components_seq()
            .map(|seq| {
                seq.iter()
                    .filter_map(|entry| serde_yaml::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append one component after the existing entries
    pub fn push_component(&mut self, component: Component) -> AppResult<()> {
        let value = serde_yaml::to_value(&component)?;
        let seq = self
            .components_seq_mut()
            .ok_or_else(|| AppError::internal("descriptor lost its component list"))?;
        seq.push(value);
        Ok(())
    }

    /// Copy of this descriptor with `RAMP_TIME` set to `delay_secs` appended
    pub fn with_ramp_time(&self, delay_secs: u64) -> AppResult<Self> {
        let mut patched = self.clone();
        patched.push_component(Component::new(RAMP_TIME, delay_secs.to_string()))?;
        Ok(patched)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    fn components_seq(&self) -> Option<&Vec<Value>> {
        self.document
            .get("spec")?
            .get("experiments")?
            .get(0)?
            .get("spec")?
            .get("components")?
            .as_sequence()
    }

    fn components_seq_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.document
            .get_mut("spec")?
            .get_mut("experiments")?
            .get_mut(0)?
            .get_mut("spec")?
            .get_mut("components")?
            .as_sequence_mut()
    }
}

/// Outcome of one experiment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentResult {
    /// Experiment identifier (descriptor file stem)
    pub name: String,
    /// Verdict reported by the chaos operator
    pub status: String,
    /// Taken just before polling started
    pub start_time: DateTime<Local>,
}

/// Which experiments `test` should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentSelection {
    All,
    Named(String),
}

impl std::str::FromStr for ExperimentSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "*" => ExperimentSelection::All,
            name => ExperimentSelection::Named(name.to_string()),
        })
    }
}

impl std::fmt::Display for ExperimentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExperimentSelection::All => write!(f, "*"),
            ExperimentSelection::Named(name) => write!(f, "{}", name),
        }
    }
}
