//! Print extension - the host-facing entry point
//!
//! Pulses:
//! - `Print`: export input 0 to a temp PNG, read parameters, hand off to the worker
//! - `Refreshprinters`: re-enumerate printers into the `Printerlist` selector
//!
//! Nothing raised here reaches the host: errors and panics are logged and
//! reduced to a `PulseOutcome`.

use crate::application::printers::PrinterDirectory;
use crate::application::worker::{
    execute_guarded, PanicGuardResult, PrintOutcome, PrintWorker, WorkerConfig,
};
use crate::domain::{
    resolve_printer, Copies, JobId, Orientation, Platform, PrintJob, PrintJobRequest, PrinterList,
};
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, FrameInfo, FrameSource, HostError, HostParameters, IdProvider, TempStore};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Pulse name that triggers a print
pub const PULSE_PRINT: &str = "Print";

/// Pulse name that re-enumerates printers
pub const PULSE_REFRESH_PRINTERS: &str = "Refreshprinters";

/// Handle to a print job running in the background
#[derive(Debug)]
pub struct PrintTicket {
    pub job_id: JobId,
    pub request: PrintJobRequest,
    pub handle: JoinHandle<PrintOutcome>,
}

impl PrintTicket {
    /// Wait for submission and cleanup; `None` if the task was lost
    pub async fn wait(self) -> Option<PrintOutcome> {
        match self.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(job_id = %self.job_id, error = ?e, "Print task did not complete");
                None
            }
        }
    }
}

/// Result of handling one pulse
#[derive(Debug)]
pub enum PulseOutcome {
    PrintStarted(PrintTicket),
    PrintersRefreshed(PrinterList),
    /// Pulse name not handled by this extension
    Ignored,
    /// Handling failed; already logged
    Failed(String),
}

/// Host capabilities and OS adapters wired at construction
pub struct ExtensionDeps {
    pub parameters: Arc<dyn HostParameters>,
    pub frames: Arc<dyn FrameSource>,
    pub temp_store: Arc<dyn TempStore>,
    pub runner: Arc<dyn CommandRunner>,
    pub id_provider: Arc<dyn IdProvider>,
}

pub struct PrintExtension {
    parameters: Arc<dyn HostParameters>,
    frames: Arc<dyn FrameSource>,
    temp_store: Arc<dyn TempStore>,
    id_provider: Arc<dyn IdProvider>,
    directory: PrinterDirectory,
    worker: Arc<PrintWorker>,
}

impl PrintExtension {
    pub fn new(deps: ExtensionDeps, platform: Platform, config: WorkerConfig) -> Self {
        let directory = PrinterDirectory::new(
            Arc::clone(&deps.runner),
            platform,
            config.enumeration_timeout,
        );
        let worker = Arc::new(PrintWorker::new(
            deps.runner,
            Arc::clone(&deps.temp_store),
            platform,
            &config,
        ));
        Self {
            parameters: deps.parameters,
            frames: deps.frames,
            temp_store: deps.temp_store,
            id_provider: deps.id_provider,
            directory,
            worker,
        }
    }

    /// First-time setup: populate the printer selector
    pub async fn initialize(&self) -> PrinterList {
        info!(platform = %self.worker.platform(), "Print extension initialized");
        self.refresh_printers().await
    }

    pub fn on_enable(&self, enabled: bool) {
        info!(enabled, "Extension enable changed");
    }

    pub fn on_create(&self, path: &str) {
        info!(path = %path, "Extension component created");
    }

    /// Dispatch a pulse event by parameter name
    pub async fn on_pulse(&self, name: &str) -> PulseOutcome {
        debug!(pulse = %name, "Pulse received");
        match name {
            PULSE_PRINT => match self.print() {
                Ok(ticket) => PulseOutcome::PrintStarted(ticket),
                Err(e) => {
                    warn!(error = %e, "Print pulse failed");
                    PulseOutcome::Failed(e.to_string())
                }
            },
            PULSE_REFRESH_PRINTERS => PulseOutcome::PrintersRefreshed(self.refresh_printers().await),
            other => {
                debug!(pulse = %other, "Ignoring unhandled pulse");
                PulseOutcome::Ignored
            }
        }
    }

    /// Export the input frame and start a background print job.
    ///
    /// Returns as soon as the worker task is spawned.
    ///
    /// # Errors
    /// - HostError::NoInput if nothing is wired into input 0
    /// - HostError / Io if the temp file cannot be created or written
    /// - AppError::Internal if a host call panicked or no runtime is available
    pub fn print(&self) -> Result<PrintTicket> {
        let job = match execute_guarded(AssertUnwindSafe(|| self.prepare_job())) {
            PanicGuardResult::Success(job) => job?,
            PanicGuardResult::Panicked(msg) => {
                return Err(AppError::Internal(format!("print preparation panicked: {}", msg)))
            }
        };

        let job_id = job.id.clone();
        let request = job.request.clone();
        let image_path = job.image_path.clone();

        let handle = match self.worker.spawn(job) {
            Ok(handle) => handle,
            Err(e) => {
                self.discard_temp(&image_path);
                return Err(e);
            }
        };

        if request.debug {
            info!(job_id = %job_id, "Background print task started");
        }
        Ok(PrintTicket {
            job_id,
            request,
            handle,
        })
    }

    /// Re-enumerate printers and write them into the selector.
    ///
    /// Auto-selects the first detected printer. Never touches the print path.
    pub async fn refresh_printers(&self) -> PrinterList {
        let printers = self.directory.enumerate().await;

        let update = execute_guarded(AssertUnwindSafe(|| self.update_selector(&printers)));
        match update {
            PanicGuardResult::Success(Ok(())) => {}
            PanicGuardResult::Success(Err(e)) => {
                warn!(error = %e, "Failed to update Printerlist menu");
            }
            PanicGuardResult::Panicked(msg) => {
                warn!(panic_msg = %msg, "Printerlist update panicked");
            }
        }

        printers
    }

    fn update_selector(&self, printers: &PrinterList) -> std::result::Result<(), HostError> {
        self.parameters.set_printer_menu(&printers.menu())?;
        match printers.first() {
            Some(first) => {
                self.parameters.select_printer(first)?;
                info!(selected = %first, "Printer list updated");
            }
            None => info!("Printer list updated: no printers found"),
        }
        Ok(())
    }

    fn prepare_job(&self) -> Result<PrintJob> {
        let frame = self.frames.input_frame().ok_or(HostError::NoInput)?;
        debug!(
            frame = %frame.path,
            width = ?frame.width,
            height = ?frame.height,
            "Using input frame"
        );

        let image_path = self.export_frame(&frame)?;
        debug!(path = %image_path.display(), "Saved frame to temporary file");

        let request = self.read_request();
        Ok(PrintJob::new(self.id_provider.generate_id(), image_path, request))
    }

    /// Save the frame to a fresh temp PNG; the temp file is removed on any failure
    fn export_frame(&self, frame: &FrameInfo) -> Result<PathBuf> {
        let path = self.temp_store.allocate()?;

        let saved = execute_guarded(AssertUnwindSafe(|| self.frames.save_frame(frame, &path)));
        let result = match saved {
            PanicGuardResult::Success(result) => result.map_err(AppError::from),
            PanicGuardResult::Panicked(msg) => Err(AppError::Host(HostError::ExportFailed(format!(
                "save panicked: {}",
                msg
            )))),
        };

        if let Err(e) = result {
            self.discard_temp(&path);
            return Err(e);
        }
        Ok(path)
    }

    fn read_request(&self) -> PrintJobRequest {
        let printer = resolve_printer(
            self.parameters.printer().as_deref(),
            self.parameters.printer_list().as_deref(),
        );
        let request = PrintJobRequest {
            printer,
            copies: self
                .parameters
                .copies()
                .map(Copies::clamped)
                .unwrap_or_default(),
            fit_to_page: self.parameters.fit_to_page().unwrap_or(true),
            fill_to_page: self.parameters.fill_to_page().unwrap_or(false),
            orientation: self
                .parameters
                .orientation()
                .map(|raw| Orientation::normalize(&raw))
                .unwrap_or_default(),
            debug: self.parameters.debug().unwrap_or(true),
        };

        if request.debug {
            info!(
                printer = ?request.printer,
                copies = request.copies.get(),
                fit_to_page = request.fit_to_page,
                fill_to_page = request.fill_to_page,
                orientation = %request.orientation,
                "Print settings"
            );
        }
        request
    }

    fn discard_temp(&self, path: &std::path::Path) {
        if let Err(e) = self.temp_store.remove(path) {
            debug!(path = %path.display(), error = %e, "Could not remove unused temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::host::mocks::{MockHost, ParameterValues, SaveBehavior};
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::temp_store::mocks::MockTempStore;
    use crate::application::worker::SubmissionStatus;
    use std::time::Duration;

    struct Fixture {
        host: Arc<MockHost>,
        runner: Arc<MockCommandRunner>,
        store: Arc<MockTempStore>,
        extension: PrintExtension,
    }

    fn fixture(host: MockHost, runner: MockCommandRunner, store: MockTempStore, platform: Platform) -> Fixture {
        let host = Arc::new(host);
        let runner = Arc::new(runner);
        let store = Arc::new(store);
        let extension = PrintExtension::new(
            ExtensionDeps {
                parameters: host.clone(),
                frames: host.clone(),
                temp_store: store.clone(),
                runner: runner.clone(),
                id_provider: Arc::new(SequentialIdProvider::default()),
            },
            platform,
            WorkerConfig {
                cleanup_delay: Duration::ZERO,
                photo_viewer_dll: Some(PathBuf::from(r"C:\PV\PhotoViewer.dll")),
                ..Default::default()
            },
        );
        Fixture {
            host,
            runner,
            store,
            extension,
        }
    }

    fn values() -> ParameterValues {
        ParameterValues {
            printer: Some(String::new()),
            printer_list: Some("(refresh)".into()),
            copies: Some(1),
            fit_to_page: Some(true),
            fill_to_page: Some(false),
            orientation: Some("auto".into()),
            debug: Some(true),
        }
    }

    #[tokio::test]
    async fn test_print_pulse_runs_lp_and_cleans_up() {
        let f = fixture(MockHost::new(values()), MockCommandRunner::new_success(), MockTempStore::new(), Platform::MacOs);

        let ticket = match f.extension.on_pulse("Print").await {
            PulseOutcome::PrintStarted(ticket) => ticket,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(ticket.job_id, "job-1");
        let outcome = ticket.wait().await.unwrap();

        assert_eq!(outcome.submission, SubmissionStatus::Submitted);
        let temp = f.store.allocated()[0].clone();
        assert_eq!(f.host.saved_paths(), vec![temp.clone()]);
        assert_eq!(
            f.runner.calls()[0].argv(),
            vec!["lp", "-o", "fit-to-page", temp.to_str().unwrap()]
        );
        assert_eq!(f.store.removed(), vec![temp]);
    }

    #[tokio::test]
    async fn test_selector_overrides_typed_printer() {
        let mut v = values();
        v.printer = Some("Typed".into());
        v.printer_list = Some("Office".into());
        v.copies = Some(3);
        v.fill_to_page = Some(true);
        let f = fixture(MockHost::new(v), MockCommandRunner::new_success(), MockTempStore::new(), Platform::Posix);

        let ticket = f.extension.print().unwrap();
        assert_eq!(ticket.request.printer(), Some("Office"));
        ticket.wait().await.unwrap();

        let args = f.runner.calls()[0].get_args().to_vec();
        assert_eq!(&args[..6], &["-d", "Office", "-n", "3", "-o", "print-scaling=fill"]);
    }

    #[tokio::test]
    async fn test_missing_parameters_use_defaults() {
        let f = fixture(
            MockHost::new(ParameterValues::default()),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let ticket = f.extension.print().unwrap();
        assert_eq!(ticket.request, PrintJobRequest::default());
        ticket.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_parameter_values_are_normalized() {
        let mut v = values();
        v.copies = Some(-2);
        v.orientation = Some("Upside Down".into());
        let f = fixture(MockHost::new(v), MockCommandRunner::new_success(), MockTempStore::new(), Platform::MacOs);

        let ticket = f.extension.print().unwrap();
        assert_eq!(ticket.request.copies, Copies::ONE);
        assert_eq!(ticket.request.orientation, Orientation::Auto);
        ticket.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_input_aborts_before_any_command() {
        let f = fixture(
            MockHost::new(values()).without_input(),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let outcome = f.extension.on_pulse("Print").await;

        assert!(matches!(outcome, PulseOutcome::Failed(_)));
        assert_eq!(f.runner.call_count(), 0);
        assert!(f.store.allocated().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_discards_temp_file() {
        let f = fixture(
            MockHost::new(values()).with_save(SaveBehavior::Fail("GPU readback failed".into())),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let outcome = f.extension.on_pulse("Print").await;

        assert!(matches!(outcome, PulseOutcome::Failed(ref m) if m.contains("GPU readback failed")));
        assert_eq!(f.runner.call_count(), 0);
        assert_eq!(f.store.removed(), f.store.allocated());
    }

    #[tokio::test]
    async fn test_save_panic_is_contained() {
        let f = fixture(
            MockHost::new(values()).with_save(SaveBehavior::Panic("host crashed".into())),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let outcome = f.extension.on_pulse("Print").await;

        assert!(matches!(outcome, PulseOutcome::Failed(_)));
        assert_eq!(f.store.removed().len(), 1);
    }

    #[tokio::test]
    async fn test_temp_allocation_failure() {
        let f = fixture(
            MockHost::new(values()),
            MockCommandRunner::new_success(),
            MockTempStore::failing_allocate(),
            Platform::MacOs,
        );

        assert!(matches!(f.extension.on_pulse("Print").await, PulseOutcome::Failed(_)));
        assert!(f.host.saved_paths().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_updates_menu_and_selects_first() {
        let f = fixture(
            MockHost::new(values()),
            MockCommandRunner::new(MockBehavior::Success(
                "printer Office is idle.\nprinter Lab is idle.\n".into(),
            )),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let outcome = f.extension.on_pulse("Refreshprinters").await;

        assert!(matches!(outcome, PulseOutcome::PrintersRefreshed(ref l) if l.detected().len() == 2));
        assert_eq!(f.host.menu(), vec!["(refresh)", "Office", "Lab"]);
        assert_eq!(f.host.selected().as_deref(), Some("Office"));
        assert!(f.store.allocated().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_only_sentinel() {
        let f = fixture(
            MockHost::new(values()),
            MockCommandRunner::new_fail("lpstat missing"),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let printers = f.extension.initialize().await;

        assert!(printers.is_empty());
        assert_eq!(f.host.menu(), vec!["(refresh)"]);
        assert_eq!(f.host.selected().as_deref(), Some("(refresh)"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// INFO-and-above log text emitted while `f` runs
    fn info_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_debug_off_silences_job_preparation() {
        let mut quiet = values();
        quiet.debug = Some(false);
        let f = fixture(
            MockHost::new(quiet),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let logs = info_logs(|| {
            let job = f.extension.prepare_job().unwrap();
            assert!(!job.verbose());
        });

        assert!(!logs.contains("Print settings"), "{}", logs);
        assert!(!logs.contains("Using input frame"), "{}", logs);
    }

    #[test]
    fn test_debug_on_logs_print_settings() {
        let f = fixture(
            MockHost::new(values()),
            MockCommandRunner::new_success(),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let logs = info_logs(|| {
            f.extension.read_request();
        });

        assert!(logs.contains("Print settings"), "{}", logs);
    }

    #[tokio::test]
    async fn test_refresh_with_panicking_runner_is_contained() {
        let f = fixture(
            MockHost::new(values()),
            MockCommandRunner::new(MockBehavior::Panic("lpstat driver crash".into())),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let outcome = f.extension.on_pulse("Refreshprinters").await;

        assert!(matches!(outcome, PulseOutcome::PrintersRefreshed(ref l) if l.is_empty()));
        assert_eq!(f.host.menu(), vec!["(refresh)"]);
        assert_eq!(f.runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_menu_write_failure_is_swallowed() {
        let f = fixture(
            MockHost::new(values()).rejecting_menu(),
            MockCommandRunner::new(MockBehavior::Success("printer Office is idle.\n".into())),
            MockTempStore::new(),
            Platform::MacOs,
        );

        let printers = f.extension.refresh_printers().await;
        assert_eq!(printers.first(), Some("Office"));
        assert!(f.host.menu().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pulse_is_ignored() {
        let f = fixture(MockHost::new(values()), MockCommandRunner::new_success(), MockTempStore::new(), Platform::MacOs);

        assert!(matches!(f.extension.on_pulse("Debug").await, PulseOutcome::Ignored));
        assert_eq!(f.runner.call_count(), 0);
    }
}
