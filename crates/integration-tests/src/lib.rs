//! Shared fixtures for frameprint integration tests

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use frameprint_core::application::{ExtensionDeps, PrintExtension, WorkerConfig};
use frameprint_core::domain::Platform;
use frameprint_core::port::command_runner::mocks::MockCommandRunner;
use frameprint_core::port::host::mocks::{MockHost, ParameterValues};
use frameprint_core::port::id_provider::SequentialIdProvider;
use frameprint_core::port::TempStore;

/// Parameter page as a freshly dropped component would have it
pub fn default_values() -> ParameterValues {
    ParameterValues {
        printer: Some(String::new()),
        printer_list: Some("(refresh)".to_string()),
        copies: Some(1),
        fit_to_page: Some(true),
        fill_to_page: Some(false),
        orientation: Some("auto".to_string()),
        debug: Some(true),
    }
}

/// Worker config without the cleanup wait
pub fn fast_config() -> WorkerConfig {
    WorkerConfig {
        cleanup_delay: Duration::ZERO,
        enumeration_timeout: Duration::from_secs(1),
        photo_viewer_dll: Some(PathBuf::from(
            r"C:\Program Files\Windows Photo Viewer\PhotoViewer.dll",
        )),
    }
}

pub fn build_extension(
    host: Arc<MockHost>,
    runner: Arc<MockCommandRunner>,
    temp_store: Arc<dyn TempStore>,
    platform: Platform,
) -> PrintExtension {
    PrintExtension::new(
        ExtensionDeps {
            parameters: host.clone(),
            frames: host,
            temp_store,
            runner,
            id_provider: Arc::new(SequentialIdProvider::default()),
        },
        platform,
        fast_config(),
    )
}
