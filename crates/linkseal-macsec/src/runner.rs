//! External command execution seam.
//!
//! The provisioner drives the system network tool through this trait so
//! unit tests can substitute a scripted runner and never touch live
//! kernel state.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::MacsecError;

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the tool exited successfully.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Combined diagnostic text, stderr first (where iproute2 complains).
    #[must_use]
    pub fn diagnostics(&self) -> String {
        let mut text = self.stderr.trim().to_string();
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout);
        }
        text
    }
}

/// Executes a program with arguments and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion.
    ///
    /// A non-zero exit is NOT an error at this layer; it is reported
    /// through [`CommandOutput::success`] so the provisioner can classify
    /// it. Only spawn failures and timeouts error here.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, MacsecError>;
}

/// Production runner using real processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    /// Default per-invocation timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Create a runner with the given per-invocation timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, MacsecError> {
        tracing::debug!(program, ?args, "running network configuration tool");

        let invocation = tokio::process::Command::new(program).args(args).output();
        let output = tokio::time::timeout(self.timeout, invocation)
            .await
            .map_err(|_| MacsecError::ToolTimeout {
                program: program.to_string(),
                elapsed: self.timeout,
            })?
            .map_err(|source| MacsecError::Exec { program: program.to_string(), source })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
