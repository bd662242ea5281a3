//! frameprint CLI - drives the print extension outside a graphics host
//!
//! The image file stands in for the host's input node; flags stand in for its
//! parameter page. `watch` emulates the host event loop by reading pulse names
//! from stdin.

mod dry_run;
mod host;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use dry_run::DryRunRunner;
use frameprint_core::application::{
    ExtensionDeps, PrintExtension, PrintOutcome, PulseOutcome, SubmissionStatus, WorkerConfig,
    PULSE_PRINT, PULSE_REFRESH_PRINTERS,
};
use frameprint_core::domain::Platform;
use frameprint_core::port::id_provider::UuidProvider;
use frameprint_core::port::time_provider::SystemTimeProvider;
use frameprint_core::port::CommandRunner;
use frameprint_infra_system::{FsTempStore, SubprocessRunner};
use host::{CliHost, HostSettings};

#[derive(Parser)]
#[command(name = "frameprint")]
#[command(about = "Print image frames through the OS print pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override platform detection (macos, windows, posix)
    #[arg(long, global = true, env = "FRAMEPRINT_PLATFORM")]
    platform: Option<String>,

    /// Delay before the temporary image is deleted, in milliseconds
    #[arg(long, global = true, env = "FRAMEPRINT_CLEANUP_DELAY_MS", default_value_t = 2000)]
    cleanup_delay_ms: u64,

    /// Timeout for printer enumeration commands, in milliseconds
    #[arg(long, global = true, env = "FRAMEPRINT_ENUMERATION_TIMEOUT_MS", default_value_t = 10_000)]
    enumeration_timeout_ms: u64,

    /// Show OS commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Emit results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an image once
    Print(PrintArgs),

    /// List printers known to the OS
    Printers,

    /// Read pulse names (Print, Refreshprinters) from stdin, one per line
    Watch(PrintArgs),
}

#[derive(Args, Clone)]
struct PrintArgs {
    /// Image to print (PNG, JPEG, BMP or TIFF)
    image: PathBuf,

    /// Printer name; empty means the OS default printer
    #[arg(short, long, env = "FRAMEPRINT_PRINTER")]
    printer: Option<String>,

    /// Selector value; overrides --printer unless empty or "(refresh)"
    #[arg(long)]
    printer_list: Option<String>,

    /// Number of copies (values below 1 print one copy)
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    copies: i64,

    /// Do not scale the image to fit the page
    #[arg(long)]
    no_fit: bool,

    /// Scale the image to fill the page (wins over fit)
    #[arg(long)]
    fill: bool,

    /// auto, portrait or landscape
    #[arg(short, long, default_value = "auto")]
    orientation: String,

    /// Suppress per-job diagnostics
    #[arg(short, long)]
    quiet: bool,
}

impl PrintArgs {
    fn settings(&self) -> HostSettings {
        HostSettings {
            printer: self.printer.clone(),
            printer_list: self.printer_list.clone(),
            copies: self.copies,
            fit_to_page: !self.no_fit,
            fill_to_page: self.fill,
            orientation: self.orientation.clone(),
            debug: !self.quiet,
        }
    }
}

#[derive(Tabled)]
struct PrinterRow {
    #[tabled(rename = "#")]
    index: usize,
    name: String,
    selected: String,
}

/// Everything `main` wires together for one invocation
struct Runtime {
    platform: Platform,
    config: WorkerConfig,
    runner: Arc<dyn CommandRunner>,
    json: bool,
}

impl Runtime {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let platform = match cli.platform.as_deref() {
            Some(raw) => raw.parse::<Platform>().context("Invalid --platform")?,
            None => Platform::current(),
        };

        let config = WorkerConfig {
            cleanup_delay: Duration::from_millis(cli.cleanup_delay_ms),
            enumeration_timeout: Duration::from_millis(cli.enumeration_timeout_ms),
            photo_viewer_dll: None,
        };

        let runner: Arc<dyn CommandRunner> = if cli.dry_run {
            Arc::new(DryRunRunner::new(cli.json))
        } else {
            Arc::new(SubprocessRunner::new(Arc::new(SystemTimeProvider)))
        };

        Ok(Self {
            platform,
            config,
            runner,
            json: cli.json,
        })
    }

    fn extension(&self, host: Arc<CliHost>) -> PrintExtension {
        PrintExtension::new(
            ExtensionDeps {
                parameters: host.clone(),
                frames: host,
                temp_store: Arc::new(FsTempStore::new()),
                runner: Arc::clone(&self.runner),
                id_provider: Arc::new(UuidProvider),
            },
            self.platform,
            self.config.clone(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let runtime = Runtime::from_cli(&cli)?;
    info!(platform = %runtime.platform, dry_run = cli.dry_run, "frameprint v{}", frameprint_core::VERSION);

    match cli.command {
        Commands::Print(args) => run_print(&runtime, args).await,
        Commands::Printers => run_printers(&runtime).await,
        Commands::Watch(args) => run_watch(&runtime, args).await,
    }
}

async fn run_print(runtime: &Runtime, args: PrintArgs) -> Result<()> {
    let host = Arc::new(CliHost::new(Some(args.image.clone()), args.settings()));
    let extension = runtime.extension(host);

    match extension.on_pulse(PULSE_PRINT).await {
        PulseOutcome::PrintStarted(ticket) => {
            let outcome = ticket
                .wait()
                .await
                .context("Print task did not complete")?;
            report_outcome(&outcome, runtime.json)?;
            if let SubmissionStatus::Failed(reason) = outcome.submission {
                bail!("print submission failed: {}", reason);
            }
            Ok(())
        }
        PulseOutcome::Failed(reason) => bail!("print failed: {}", reason),
        other => bail!("unexpected pulse outcome: {:?}", other),
    }
}

async fn run_printers(runtime: &Runtime) -> Result<()> {
    let host = Arc::new(CliHost::new(None, HostSettings::default()));
    let extension = runtime.extension(host.clone());

    let printers = match extension.on_pulse(PULSE_REFRESH_PRINTERS).await {
        PulseOutcome::PrintersRefreshed(printers) => printers,
        other => bail!("unexpected pulse outcome: {:?}", other),
    };

    if runtime.json {
        let body = json!({
            "printers": printers.detected(),
            "menu": host.menu(),
            "selected": host.selected(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if printers.is_empty() {
        println!("{}", "No printers found".yellow());
        return Ok(());
    }

    let selected = host.selected();
    let rows: Vec<PrinterRow> = printers
        .detected()
        .iter()
        .enumerate()
        .map(|(i, name)| PrinterRow {
            index: i + 1,
            name: name.clone(),
            selected: if selected.as_deref() == Some(name.as_str()) {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    println!("{}", "Printers".cyan().bold());
    println!("{}", Table::new(rows));
    Ok(())
}

async fn run_watch(runtime: &Runtime, args: PrintArgs) -> Result<()> {
    let host = Arc::new(CliHost::new(Some(args.image.clone()), args.settings()));
    let extension = runtime.extension(host);
    extension.initialize().await;

    eprintln!(
        "{}",
        format!("Waiting for pulses on stdin ({}, {})", PULSE_PRINT, PULSE_REFRESH_PRINTERS).cyan()
    );

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let pulse = line.trim();
        if pulse.is_empty() {
            continue;
        }
        match extension.on_pulse(pulse).await {
            PulseOutcome::PrintStarted(ticket) => {
                eprintln!("{} {}", "print started:".green(), ticket.job_id);
                pending.push(ticket);
            }
            PulseOutcome::PrintersRefreshed(printers) => {
                eprintln!("{} {}", "printers:".green(), printers.detected().join(", "));
            }
            PulseOutcome::Ignored => eprintln!("{} {}", "ignored pulse:".yellow(), pulse),
            PulseOutcome::Failed(reason) => eprintln!("{} {}", "pulse failed:".red(), reason),
        }
    }

    for ticket in pending {
        if let Some(outcome) = ticket.wait().await {
            report_outcome(&outcome, runtime.json)?;
        }
    }
    Ok(())
}

fn report_outcome(outcome: &PrintOutcome, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string(outcome)?);
        return Ok(());
    }

    match &outcome.submission {
        SubmissionStatus::Submitted => {
            println!("{}", format!("✓ Job {} submitted", outcome.job_id).green().bold())
        }
        SubmissionStatus::Failed(reason) => {
            println!("{}", format!("✗ Job {} failed: {}", outcome.job_id, reason).red().bold())
        }
    }
    if !outcome.temp_removed {
        println!("{}", "Temporary image could not be deleted".yellow());
    }
    Ok(())
}
