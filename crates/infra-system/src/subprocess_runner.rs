// Subprocess runner implementation
// reason: tokio::process so print tools never block the runtime threads
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use frameprint_core::domain::CommandLine;
use frameprint_core::port::command_runner::{
    CommandOutput, CommandRunner, ExecutionError, ExecutionStatus,
};
use frameprint_core::port::TimeProvider;

/// Runs OS tools as child processes and captures their output
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(
        &self,
        command: &CommandLine,
    ) -> Result<std::process::Output, ExecutionError> {
        let child = Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed {
                program: command.program().to_string(),
                reason: e.to_string(),
            })?;

        match command.timeout() {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(ExecutionError::IoError(e.to_string())),
                // Dropping the wait future drops the child, which kills it
                Err(_) => Err(ExecutionError::Timeout(limit.as_millis() as u64)),
            },
            None => child
                .wait_with_output()
                .await
                .map_err(|e| ExecutionError::IoError(e.to_string())),
        }
    }

    /// Build command output from process output
    fn build_output(&self, output: std::process::Output, duration_ms: i64) -> CommandOutput {
        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        CommandOutput {
            status,
            exit_code: output.status.code(),
            duration_ms,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        debug!(
            command = %command,
            timeout_ms = ?command.timeout().map(|t| t.as_millis()),
            "Starting subprocess"
        );

        let output = self.spawn_and_wait(command).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = self.build_output(output, duration_ms);

        info!(
            program = %command.program(),
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Subprocess completed"
        );

        Ok(result)
    }
}
