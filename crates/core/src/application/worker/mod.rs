// Print Worker - background submission + guaranteed temp-file cleanup

pub mod constants;
mod panic_guard;

use constants::*;
pub use panic_guard::{execute_guarded, PanicGuardResult};
pub(crate) use panic_guard::panic_message;

use crate::application::commands::{
    default_photo_viewer_dll, lp_command, mspaint_command, photo_viewer_command,
};
use crate::domain::{JobId, Platform, PrintJob};
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, ExecutionError, TempStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Tunables for the worker and printer enumeration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Wait between submission and temp-file deletion
    pub cleanup_delay: Duration,
    /// Timeout applied to printer enumeration commands
    pub enumeration_timeout: Duration,
    /// Photo Viewer DLL override (Windows fallback); resolved from the environment when `None`
    pub photo_viewer_dll: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cleanup_delay: CLEANUP_DELAY,
            enumeration_timeout: ENUMERATION_TIMEOUT,
            photo_viewer_dll: None,
        }
    }
}

/// Whether the OS tool accepted the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Failed(String),
}

/// What happened to one print job
#[derive(Debug, Clone, Serialize)]
pub struct PrintOutcome {
    pub job_id: JobId,
    pub submission: SubmissionStatus,
    /// False when deletion failed (e.g. file still locked by a viewer)
    pub temp_removed: bool,
}

/// Runs print jobs off the host's interactive thread.
///
/// One detached task per job; no queue, no cancellation.
pub struct PrintWorker {
    runner: Arc<dyn CommandRunner>,
    temp_store: Arc<dyn TempStore>,
    platform: Platform,
    cleanup_delay: Duration,
    photo_viewer_dll: PathBuf,
}

impl PrintWorker {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        temp_store: Arc<dyn TempStore>,
        platform: Platform,
        config: &WorkerConfig,
    ) -> Self {
        let photo_viewer_dll = config
            .photo_viewer_dll
            .clone()
            .unwrap_or_else(default_photo_viewer_dll);
        Self {
            runner,
            temp_store,
            platform,
            cleanup_delay: config.cleanup_delay,
            photo_viewer_dll,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Start a detached task for `job` on the current tokio runtime
    ///
    /// # Errors
    /// - AppError::Internal if called outside a tokio runtime
    pub fn spawn(self: &Arc<Self>, job: PrintJob) -> Result<JoinHandle<PrintOutcome>> {
        let runtime = Handle::try_current()
            .map_err(|e| AppError::Internal(format!("no async runtime for print worker: {}", e)))?;
        let worker = Arc::clone(self);
        Ok(runtime.spawn(async move { worker.run(job).await }))
    }

    /// Submit the job, then always wait and delete its temp file
    pub async fn run(&self, job: PrintJob) -> PrintOutcome {
        let job = Arc::new(job);

        if job.verbose() {
            info!(
                job_id = %job.id,
                platform = %self.platform,
                scaling = ?job.request.scaling(),
                orientation = %job.request.orientation,
                "Print worker started"
            );
        }

        // Submission runs in its own task so a panic there still reaches cleanup
        let runner = Arc::clone(&self.runner);
        let platform = self.platform;
        let dll = self.photo_viewer_dll.clone();
        let job_for_submit = Arc::clone(&job);
        let handle = tokio::spawn(async move {
            Self::submit_static(runner.as_ref(), platform, &dll, &job_for_submit).await
        });

        let submission = match handle.await {
            Ok(status) => status,
            Err(join_err) => {
                error!(job_id = %job.id, error = ?join_err, "Print submission task aborted");
                SubmissionStatus::Failed(format!("submission task aborted: {}", join_err))
            }
        };

        sleep(self.cleanup_delay).await;
        let temp_removed = self.cleanup(&job);

        PrintOutcome {
            job_id: job.id.clone(),
            submission,
            temp_removed,
        }
    }

    async fn submit_static(
        runner: &dyn CommandRunner,
        platform: Platform,
        photo_viewer_dll: &Path,
        job: &PrintJob,
    ) -> SubmissionStatus {
        if platform.uses_cups() {
            Self::submit_cups(runner, job).await
        } else {
            Self::submit_windows(runner, photo_viewer_dll, job).await
        }
    }

    async fn submit_cups(runner: &dyn CommandRunner, job: &PrintJob) -> SubmissionStatus {
        let command = lp_command(job.image_path(), &job.request);
        if job.verbose() {
            info!(job_id = %job.id, command = %command, "CUPS print command");
        }

        match runner.run_checked(&command).await {
            Ok(output) => {
                if job.verbose() {
                    info!(job_id = %job.id, stdout = %output.stdout.trim(), "CUPS print submitted");
                }
                SubmissionStatus::Submitted
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "CUPS print failed");
                SubmissionStatus::Failed(e.to_string())
            }
        }
    }

    /// mspaint has no copies flag: one submission per copy
    async fn submit_windows(
        runner: &dyn CommandRunner,
        photo_viewer_dll: &Path,
        job: &PrintJob,
    ) -> SubmissionStatus {
        if job.request.orientation.is_explicit() && job.verbose() {
            info!(
                job_id = %job.id,
                requested = %job.request.orientation,
                "Windows: orientation cannot be set via mspaint; using printer defaults"
            );
        }

        let copies = job.request.copies.get();
        let mut last_error = None;
        let mut failed = 0u32;

        for copy in 1..=copies {
            if job.verbose() {
                info!(job_id = %job.id, copy, copies, "Submitting copy");
            }
            if let Err(e) = Self::submit_windows_copy(runner, photo_viewer_dll, job).await {
                failed += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            None => SubmissionStatus::Submitted,
            Some(e) => SubmissionStatus::Failed(format!("{} of {} copies failed: {}", failed, copies, e)),
        }
    }

    async fn submit_windows_copy(
        runner: &dyn CommandRunner,
        photo_viewer_dll: &Path,
        job: &PrintJob,
    ) -> std::result::Result<(), ExecutionError> {
        let printer = job.request.printer();

        let paint = mspaint_command(job.image_path(), printer);
        if job.verbose() {
            info!(job_id = %job.id, command = %paint, "Windows mspaint command");
        }
        match runner.run_checked(&paint).await {
            Ok(_) => {
                if job.verbose() {
                    info!(job_id = %job.id, "mspaint submitted");
                }
                return Ok(());
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "mspaint print failed, trying Photo Viewer");
            }
        }

        let viewer = photo_viewer_command(photo_viewer_dll, job.image_path(), printer);
        if job.verbose() {
            info!(job_id = %job.id, command = %viewer, "Windows Photo Viewer command");
        }
        match runner.run_checked(&viewer).await {
            Ok(_) => {
                if job.verbose() {
                    info!(job_id = %job.id, "Photo Viewer submitted");
                }
                Ok(())
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Windows print failed (Photo Viewer fallback)");
                Err(e)
            }
        }
    }

    fn cleanup(&self, job: &PrintJob) -> bool {
        match self.temp_store.remove(job.image_path()) {
            Ok(()) => {
                if job.verbose() {
                    info!(job_id = %job.id, path = %job.image_path().display(), "Temporary file deleted");
                }
                true
            }
            Err(e) => {
                warn!(
                    job_id = %job.id,
                    path = %job.image_path().display(),
                    error = %e,
                    "Could not delete temporary file (might be in use)"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Copies, Orientation, PrintJobRequest};
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::temp_store::mocks::MockTempStore;

    fn config() -> WorkerConfig {
        WorkerConfig {
            cleanup_delay: Duration::ZERO,
            photo_viewer_dll: Some(PathBuf::from(r"C:\PV\PhotoViewer.dll")),
            ..Default::default()
        }
    }

    fn job(request: PrintJobRequest) -> PrintJob {
        PrintJob::new("job-1", "/tmp/frameprint_test.png", request)
    }

    fn worker(
        runner: Arc<MockCommandRunner>,
        store: Arc<MockTempStore>,
        platform: Platform,
    ) -> Arc<PrintWorker> {
        Arc::new(PrintWorker::new(runner, store, platform, &config()))
    }

    #[tokio::test]
    async fn test_cups_success_removes_temp_once() {
        let runner = Arc::new(MockCommandRunner::new_success());
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner.clone(), store.clone(), Platform::MacOs);

        let outcome = worker.spawn(job(PrintJobRequest::default())).unwrap().await.unwrap();

        assert_eq!(outcome.submission, SubmissionStatus::Submitted);
        assert!(outcome.temp_removed);
        assert_eq!(runner.programs(), vec!["lp"]);
        assert_eq!(store.removed(), vec![PathBuf::from("/tmp/frameprint_test.png")]);
    }

    #[tokio::test]
    async fn test_cups_failure_still_removes_temp_once() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Exit(1, "lp: Error".into())));
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner.clone(), store.clone(), Platform::Posix);

        let outcome = worker.run(job(PrintJobRequest::default())).await;

        assert!(matches!(outcome.submission, SubmissionStatus::Failed(_)));
        assert_eq!(store.removed().len(), 1);
        // No fallback on CUPS platforms
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_runner_still_removes_temp() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Panic("driver crash".into())));
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner, store.clone(), Platform::MacOs);

        let outcome = worker.run(job(PrintJobRequest::default())).await;

        assert!(matches!(outcome.submission, SubmissionStatus::Failed(_)));
        assert_eq!(store.removed().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_failure_is_tolerated() {
        let runner = Arc::new(MockCommandRunner::new_success());
        let store = Arc::new(MockTempStore::failing_remove());
        let worker = worker(runner, store.clone(), Platform::MacOs);

        let outcome = worker.run(job(PrintJobRequest::default())).await;

        assert_eq!(outcome.submission, SubmissionStatus::Submitted);
        assert!(!outcome.temp_removed);
        assert_eq!(store.removed().len(), 1);
    }

    #[tokio::test]
    async fn test_windows_fallback_to_photo_viewer() {
        let runner = Arc::new(
            MockCommandRunner::new_success()
                .with_program("mspaint.exe", MockBehavior::Fail("not installed".into())),
        );
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner.clone(), store.clone(), Platform::Windows);

        let request = PrintJobRequest {
            printer: Some("Office".into()),
            orientation: Orientation::Landscape,
            ..Default::default()
        };
        let outcome = worker.run(job(request)).await;

        assert_eq!(outcome.submission, SubmissionStatus::Submitted);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program(), "mspaint.exe");
        assert_eq!(
            calls[1].argv(),
            vec![
                "rundll32.exe",
                r"C:\PV\PhotoViewer.dll,ImageView_PrintTo",
                "/tmp/frameprint_test.png",
                "Office"
            ]
        );
        assert_eq!(store.removed().len(), 1);
    }

    #[tokio::test]
    async fn test_windows_repeats_per_copy() {
        let runner = Arc::new(MockCommandRunner::new_success());
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner.clone(), store.clone(), Platform::Windows);

        let request = PrintJobRequest {
            copies: Copies::clamped(3),
            ..Default::default()
        };
        worker.run(job(request)).await;

        assert_eq!(runner.programs(), vec!["mspaint.exe"; 3]);
        assert_eq!(store.removed().len(), 1);
    }

    #[tokio::test]
    async fn test_windows_all_tools_fail() {
        let runner = Arc::new(MockCommandRunner::new_fail("no print tools"));
        let store = Arc::new(MockTempStore::new());
        let worker = worker(runner.clone(), store.clone(), Platform::Windows);

        let request = PrintJobRequest {
            copies: Copies::clamped(2),
            ..Default::default()
        };
        let outcome = worker.run(job(request)).await;

        match outcome.submission {
            SubmissionStatus::Failed(reason) => assert!(reason.starts_with("2 of 2 copies failed")),
            other => panic!("unexpected submission: {:?}", other),
        }
        assert_eq!(runner.call_count(), 4);
        assert_eq!(store.removed().len(), 1);
    }

    #[test]
    fn test_spawn_outside_runtime_is_an_error() {
        let worker = worker(
            Arc::new(MockCommandRunner::new_success()),
            Arc::new(MockTempStore::new()),
            Platform::MacOs,
        );
        assert!(matches!(
            worker.spawn(job(PrintJobRequest::default())),
            Err(AppError::Internal(_))
        ));
    }
}
