//! Error types shared across the crate

use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// A named experiment has no descriptor in the experiments directory
    #[error("{file} not found in {dir} directory. Please check the name and try again.")]
    ExperimentNotFound { file: String, dir: String },

    /// A descriptor is missing a field the runner depends on
    #[error("Invalid experiment descriptor {path}: {reason}")]
    InvalidDescriptor { path: String, reason: String },

    /// The external tool could not be started at all
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but reported failure
    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl AppError {
    pub fn internal(message: &str) -> Self {
        AppError::Internal(message.to_string())
    }

    pub fn parse(what: &str, reason: impl std::fmt::Display) -> Self {
        AppError::Parse {
            what: what.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ExperimentNotFound { .. } => 2,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let missing = AppError::ExperimentNotFound {
            file: "network-loss.yaml".to_string(),
            dir: "./litmus".to_string(),
        };
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(AppError::internal("boom").exit_code(), 1);
    }

    #[test]
    fn test_command_failed_display() {
        let err = AppError::CommandFailed {
            command: "kubectl create -f temp.yaml".to_string(),
            code: Some(1),
            stderr: "already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`kubectl create -f temp.yaml` exited with status 1: already exists"
        );
    }
}
