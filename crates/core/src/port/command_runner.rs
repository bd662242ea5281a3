// Command Runner Port
// Abstraction for running OS print / enumeration tools

use crate::domain::CommandLine;
use async_trait::async_trait;
use thiserror::Error;

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("Spawn failed for {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{program} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Process timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the OS tool (infra-system)
/// - mocks::MockCommandRunner: records commands, scripted results
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output
    ///
    /// A non-zero exit status is NOT an error here; see `run_checked`.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the program cannot be started
    /// - ExecutionError::Timeout if the command's timeout elapses
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecutionError>;

    /// Run a command and treat a non-zero exit status as failure
    async fn run_checked(&self, command: &CommandLine) -> Result<CommandOutput, ExecutionError> {
        let output = self.run(command).await?;
        if output.is_success() {
            Ok(output)
        } else {
            Err(ExecutionError::NonZeroExit {
                program: command.program().to_string(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock command behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 with the given stdout
        Success(String),
        /// Exit with a non-zero code and stderr
        Exit(i32, String),
        /// Fail to spawn with message
        Fail(String),
        /// Time out after N ms
        Timeout(u64),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Command Runner for testing
    ///
    /// Behavior is chosen per program name, falling back to a default.
    pub struct MockCommandRunner {
        default: MockBehavior,
        by_program: Mutex<HashMap<String, MockBehavior>>,
        calls: Mutex<Vec<CommandLine>>,
    }

    impl MockCommandRunner {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                by_program: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success(String::new()))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        /// Override the behavior for one program
        pub fn with_program(self, program: impl Into<String>, behavior: MockBehavior) -> Self {
            self.by_program
                .lock()
                .unwrap()
                .insert(program.into(), behavior);
            self
        }

        pub fn calls(&self) -> Vec<CommandLine> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn programs(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.program().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecutionError> {
            self.calls.lock().unwrap().push(command.clone());

            let behavior = self
                .by_program
                .lock()
                .unwrap()
                .get(command.program())
                .cloned()
                .unwrap_or_else(|| self.default.clone());

            match behavior {
                MockBehavior::Success(stdout) => Ok(CommandOutput {
                    status: ExecutionStatus::Success,
                    duration_ms: 1,
                    exit_code: Some(0),
                    stdout,
                    stderr: String::new(),
                }),
                MockBehavior::Exit(code, stderr) => Ok(CommandOutput {
                    status: ExecutionStatus::Failed,
                    duration_ms: 1,
                    exit_code: Some(code),
                    stdout: String::new(),
                    stderr,
                }),
                MockBehavior::Fail(msg) => Err(ExecutionError::SpawnFailed {
                    program: command.program().to_string(),
                    reason: msg,
                }),
                MockBehavior::Timeout(ms) => Err(ExecutionError::Timeout(ms)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg);
                }
            }
        }
    }
}
