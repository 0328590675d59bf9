//! External tool invocations
//!
//! A `ToolCommand` is plain data: which program, which arguments, and how its
//! output should be handled. Builders in `k8s`, `helm` and `gke` produce them;
//! a `CommandRunner` executes them.

use std::fmt;

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect output so the caller can parse it
    Captured,
    /// Stream straight to the terminal (also keeps stdin attached for prompts)
    Inherited,
}

/// A single invocation of an external command-line tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub output: OutputMode,
    /// Arguments carry credentials and must not be displayed
    pub sensitive: bool,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output: OutputMode::Captured,
            sensitive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Stream output to the terminal instead of capturing it
    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherited;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// True when the first `prefix.len()` arguments equal `prefix`
    pub fn has_args_prefix(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len()
            && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        if self.sensitive {
            // Keep the subcommand for context, hide everything after it
            let shown = self.args.iter().take_while(|a| !a.starts_with('-')).take(2);
            for arg in shown {
                write!(f, " {}", arg)?;
            }
            return write!(f, " [arguments redacted]");
        }
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of running a `ToolCommand`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout without the trailing line terminator
    pub fn stdout_line(&self) -> &str {
        self.stdout
            .strip_suffix("\r\n")
            .or_else(|| self.stdout.strip_suffix('\n'))
            .unwrap_or(&self.stdout)
    }
}
