//! Process execution

use std::process::Stdio;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::command::{CommandOutput, OutputMode, ToolCommand};
use crate::error::{AppError, AppResult};

/// Executes external commands
///
/// Everything that talks to `gcloud`, `kubectl` or `helm` goes through this
/// trait so the orchestration logic can be exercised without the tools.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion. A non-zero exit is reported in the
    /// returned `CommandOutput`, not as an error.
    fn run(&self, command: ToolCommand) -> BoxFuture<'static, AppResult<CommandOutput>>;
}

/// Runs commands as child processes via `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: ToolCommand) -> BoxFuture<'static, AppResult<CommandOutput>> {
        async move {
            debug!("Executing: {}", command);

            let mut cmd = Command::new(&command.program);
            cmd.args(&command.args);

            match command.output {
                OutputMode::Captured => {
                    let output = cmd
                        .stdin(Stdio::null())
                        .stdout(Stdio::piped())
                        .stderr(Stdio::piped())
                        .output()
                        .await
                        .map_err(|source| AppError::Spawn {
                            program: command.program.clone(),
                            source,
                        })?;

                    Ok(CommandOutput {
                        code: output.status.code(),
                        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    })
                }
                OutputMode::Inherited => {
                    let status = cmd
                        .stdin(Stdio::inherit())
                        .stdout(Stdio::inherit())
                        .stderr(Stdio::inherit())
                        .status()
                        .await
                        .map_err(|source| AppError::Spawn {
                            program: command.program.clone(),
                            source,
                        })?;

                    Ok(CommandOutput {
                        code: status.code(),
                        ..Default::default()
                    })
                }
            }
        }
        .boxed()
    }
}

/// Run a command and turn a non-zero exit into `AppError::CommandFailed`
pub async fn run_checked<R>(runner: &R, command: ToolCommand) -> AppResult<CommandOutput>
where
    R: CommandRunner + ?Sized,
{
    let shown = command.to_string();
    let output = runner.run(command).await?;

    if output.is_success() {
        Ok(output)
    } else {
        let stderr = output.stderr.trim().to_string();
        if !stderr.is_empty() {
            warn!("{} stderr: {}", shown, stderr);
        }
        Err(AppError::CommandFailed {
            command: shown,
            code: output.code,
            stderr,
        })
    }
}
