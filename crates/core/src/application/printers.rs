//! Printer enumeration via the OS command-line tools
//!
//! Failures never propagate: the caller always gets a list, possibly empty,
//! and the selector always carries the refresh sentinel.

use crate::application::commands::{lpstat_command, powershell_printers_command, wmic_printers_command};
use crate::application::worker::panic_message;
use crate::domain::{CommandLine, Platform, PrinterList};
use crate::port::{CommandOutput, CommandRunner, ExecutionError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Queries installed printers for one platform
#[derive(Clone)]
pub struct PrinterDirectory {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    timeout: Duration,
}

impl PrinterDirectory {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform, timeout: Duration) -> Self {
        Self {
            runner,
            platform,
            timeout,
        }
    }

    /// List printers; any failure or panic yields an empty list
    pub async fn enumerate(&self) -> PrinterList {
        // Query runs in its own task so a panicking runner cannot unwind into the caller
        let directory = self.clone();
        let queried = tokio::spawn(async move { directory.query().await }).await;

        match queried {
            Ok(Ok(names)) => {
                info!(platform = %self.platform, count = names.len(), "Printers enumerated");
                PrinterList::new(names)
            }
            Ok(Err(e)) => {
                warn!(platform = %self.platform, error = %e, "Printer list refresh failed");
                PrinterList::empty()
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    panic_message(join_err.into_panic().as_ref())
                } else {
                    join_err.to_string()
                };
                warn!(platform = %self.platform, reason = %reason, "Printer query task aborted");
                PrinterList::empty()
            }
        }
    }

    async fn query(&self) -> Result<Vec<String>, ExecutionError> {
        if self.platform.uses_cups() {
            let output = self.run(lpstat_command()).await?;
            return Ok(parse_lpstat(&output.stdout));
        }

        match self.run(wmic_printers_command()).await {
            Ok(output) => Ok(parse_wmic(&output.stdout)),
            Err(e) => {
                debug!(error = %e, "wmic failed, falling back to PowerShell Get-Printer");
                let output = self.run(powershell_printers_command()).await?;
                Ok(parse_plain_lines(&output.stdout))
            }
        }
    }

    async fn run(&self, command: CommandLine) -> Result<CommandOutput, ExecutionError> {
        let command = command.with_timeout(self.timeout);
        debug!(command = %command, "Querying printers");
        self.runner.run_checked(&command).await
    }
}

/// Names from `lpstat -p` (`printer <name> is idle. ...`)
pub fn parse_lpstat(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.starts_with("printer "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Names from `wmic printer get name` (first line is the `Name` header)
pub fn parse_wmic(output: &str) -> Vec<String> {
    parse_plain_lines_from(output.lines().skip(1))
}

/// One name per non-blank line (PowerShell `-ExpandProperty Name`)
pub fn parse_plain_lines(output: &str) -> Vec<String> {
    parse_plain_lines_from(output.lines())
}

fn parse_plain_lines_from<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
