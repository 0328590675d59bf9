//! External command execution
//!
//! The only way this crate affects the outside world is by running
//! `gcloud`, `kubectl` and `helm`.

mod command;
mod runner;

pub use command::{CommandOutput, OutputMode, ToolCommand};
pub use runner::{run_checked, CommandRunner, SystemRunner};

#[cfg(test)]
pub use runner::MockCommandRunner;
