// Host Ports
// Capabilities the graphics host injects: parameter access and frame export

use std::path::Path;
use thiserror::Error;

/// Upstream image node resolved from input 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// Host path of the node, for logging
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl FrameInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Host-side failures
#[derive(Error, Debug)]
pub enum HostError {
    #[error("No image source connected to input 0")]
    NoInput,

    #[error("Frame export failed: {0}")]
    ExportFailed(String),

    #[error("Parameter {name} could not be updated: {reason}")]
    ParameterWrite { name: String, reason: String },
}

/// Parameter page of the owning component.
///
/// Every read returns `None` when the parameter does not exist on the host,
/// in which case the caller applies its default.
pub trait HostParameters: Send + Sync {
    /// `Printer`: manually typed printer name
    fn printer(&self) -> Option<String>;

    /// `Printerlist`: current selector value
    fn printer_list(&self) -> Option<String>;

    /// `Copies`
    fn copies(&self) -> Option<i64>;

    /// `Fittopage`
    fn fit_to_page(&self) -> Option<bool>;

    /// `Filltopage`
    fn fill_to_page(&self) -> Option<bool>;

    /// `Orientation`: raw menu value
    fn orientation(&self) -> Option<String>;

    /// `Debug`
    fn debug(&self) -> Option<bool>;

    /// Replace the selector entries (names double as labels)
    fn set_printer_menu(&self, names: &[String]) -> Result<(), HostError>;

    /// Set the selector value
    fn select_printer(&self, name: &str) -> Result<(), HostError>;
}

/// Access to the upstream image node.
///
/// Called on the host's interactive thread only.
pub trait FrameSource: Send + Sync {
    /// Resolve the node wired into input 0, if any
    fn input_frame(&self) -> Option<FrameInfo>;

    /// Encode the node's current frame as PNG at `path`
    fn save_frame(&self, frame: &FrameInfo, path: &Path) -> Result<(), HostError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Raw parameter values; `None` means the parameter is missing
    #[derive(Debug, Clone, Default)]
    pub struct ParameterValues {
        pub printer: Option<String>,
        pub printer_list: Option<String>,
        pub copies: Option<i64>,
        pub fit_to_page: Option<bool>,
        pub fill_to_page: Option<bool>,
        pub orientation: Option<String>,
        pub debug: Option<bool>,
    }

    /// What `save_frame` does
    #[derive(Debug, Clone)]
    pub enum SaveBehavior {
        Succeed,
        Fail(String),
        Panic(String),
    }

    /// Fake host: in-memory parameters plus a scripted frame source
    pub struct MockHost {
        values: Mutex<ParameterValues>,
        frame: Option<FrameInfo>,
        save: SaveBehavior,
        menu: Mutex<Vec<String>>,
        saved: Mutex<Vec<PathBuf>>,
        reject_menu: bool,
    }

    impl MockHost {
        pub fn new(values: ParameterValues) -> Self {
            Self {
                values: Mutex::new(values),
                frame: Some(FrameInfo::new("/project1/moviefilein1").with_size(1920, 1080)),
                save: SaveBehavior::Succeed,
                menu: Mutex::new(Vec::new()),
                saved: Mutex::new(Vec::new()),
                reject_menu: false,
            }
        }

        /// No image node wired into input 0
        pub fn without_input(mut self) -> Self {
            self.frame = None;
            self
        }

        pub fn with_save(mut self, save: SaveBehavior) -> Self {
            self.save = save;
            self
        }

        /// Make menu writes fail
        pub fn rejecting_menu(mut self) -> Self {
            self.reject_menu = true;
            self
        }

        pub fn menu(&self) -> Vec<String> {
            self.menu.lock().unwrap().clone()
        }

        pub fn selected(&self) -> Option<String> {
            self.values.lock().unwrap().printer_list.clone()
        }

        pub fn saved_paths(&self) -> Vec<PathBuf> {
            self.saved.lock().unwrap().clone()
        }
    }

    impl HostParameters for MockHost {
        fn printer(&self) -> Option<String> {
            self.values.lock().unwrap().printer.clone()
        }

        fn printer_list(&self) -> Option<String> {
            self.values.lock().unwrap().printer_list.clone()
        }

        fn copies(&self) -> Option<i64> {
            self.values.lock().unwrap().copies
        }

        fn fit_to_page(&self) -> Option<bool> {
            self.values.lock().unwrap().fit_to_page
        }

        fn fill_to_page(&self) -> Option<bool> {
            self.values.lock().unwrap().fill_to_page
        }

        fn orientation(&self) -> Option<String> {
            self.values.lock().unwrap().orientation.clone()
        }

        fn debug(&self) -> Option<bool> {
            self.values.lock().unwrap().debug
        }

        fn set_printer_menu(&self, names: &[String]) -> Result<(), HostError> {
            if self.reject_menu {
                return Err(HostError::ParameterWrite {
                    name: "Printerlist".to_string(),
                    reason: "read-only".to_string(),
                });
            }
            *self.menu.lock().unwrap() = names.to_vec();
            Ok(())
        }

        fn select_printer(&self, name: &str) -> Result<(), HostError> {
            self.values.lock().unwrap().printer_list = Some(name.to_string());
            Ok(())
        }
    }

    impl FrameSource for MockHost {
        fn input_frame(&self) -> Option<FrameInfo> {
            self.frame.clone()
        }

        fn save_frame(&self, _frame: &FrameInfo, path: &Path) -> Result<(), HostError> {
            self.saved.lock().unwrap().push(path.to_path_buf());
            match &self.save {
                SaveBehavior::Succeed => Ok(()),
                SaveBehavior::Fail(msg) => Err(HostError::ExportFailed(msg.clone())),
                SaveBehavior::Panic(msg) => panic!("{}", msg),
            }
        }
    }
}
