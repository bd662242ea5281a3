// Dry-run command runner: shows what would be executed

use async_trait::async_trait;
use colored::Colorize;

use frameprint_core::domain::CommandLine;
use frameprint_core::port::command_runner::{
    CommandOutput, CommandRunner, ExecutionError, ExecutionStatus,
};

/// Prints each command and reports success without running it.
/// Printer queries therefore return no printers.
pub struct DryRunRunner {
    to_stderr: bool,
}

impl DryRunRunner {
    /// With `json` set, stdout carries only JSON results and commands go to stderr
    pub fn new(json: bool) -> Self {
        Self { to_stderr: json }
    }

    fn announce(&self, command: &CommandLine) {
        let line = format!("{} {}", "would run:".cyan().bold(), command);
        if self.to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecutionError> {
        self.announce(command);
        Ok(CommandOutput {
            status: ExecutionStatus::Success,
            duration_ms: 0,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_keeps_stdout_clean() {
        assert!(DryRunRunner::new(true).to_stderr);
        assert!(!DryRunRunner::new(false).to_stderr);
    }

    #[tokio::test]
    async fn test_dry_run_reports_success_without_output() {
        let output = DryRunRunner::new(true)
            .run_checked(&CommandLine::new("lpstat").arg("-p"))
            .await
            .unwrap();

        assert!(output.is_success());
        assert!(output.stdout.is_empty());
    }
}
