// File-backed host: stands in for the graphics host outside of it
// reason: image crate decodes any raster input and re-encodes it as PNG

use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use frameprint_core::port::{FrameInfo, FrameSource, HostError, HostParameters};

/// Parameter values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct HostSettings {
    pub printer: Option<String>,
    pub printer_list: Option<String>,
    pub copies: i64,
    pub fit_to_page: bool,
    pub fill_to_page: bool,
    pub orientation: String,
    pub debug: bool,
}

/// Host stub whose "input 0" is an image file on disk
pub struct CliHost {
    image: Option<PathBuf>,
    settings: Mutex<HostSettings>,
    menu: Mutex<Vec<String>>,
}

impl CliHost {
    pub fn new(image: Option<PathBuf>, settings: HostSettings) -> Self {
        Self {
            image,
            settings: Mutex::new(settings),
            menu: Mutex::new(Vec::new()),
        }
    }

    pub fn menu(&self) -> Vec<String> {
        lock(&self.menu).clone()
    }

    pub fn selected(&self) -> Option<String> {
        lock(&self.settings).printer_list.clone()
    }

    fn settings(&self) -> HostSettings {
        lock(&self.settings).clone()
    }
}

// A panicked writer leaves plain data behind; keep serving it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HostParameters for CliHost {
    fn printer(&self) -> Option<String> {
        self.settings().printer
    }

    fn printer_list(&self) -> Option<String> {
        self.settings().printer_list
    }

    fn copies(&self) -> Option<i64> {
        Some(self.settings().copies)
    }

    fn fit_to_page(&self) -> Option<bool> {
        Some(self.settings().fit_to_page)
    }

    fn fill_to_page(&self) -> Option<bool> {
        Some(self.settings().fill_to_page)
    }

    fn orientation(&self) -> Option<String> {
        Some(self.settings().orientation)
    }

    fn debug(&self) -> Option<bool> {
        Some(self.settings().debug)
    }

    fn set_printer_menu(&self, names: &[String]) -> Result<(), HostError> {
        *lock(&self.menu) = names.to_vec();
        Ok(())
    }

    fn select_printer(&self, name: &str) -> Result<(), HostError> {
        lock(&self.settings).printer_list = Some(name.to_string());
        Ok(())
    }
}

impl FrameSource for CliHost {
    fn input_frame(&self) -> Option<FrameInfo> {
        let source = self.image.as_deref().filter(|p| p.is_file())?;
        let frame = FrameInfo::new(source.display().to_string());
        match image::image_dimensions(source) {
            Ok((w, h)) => Some(frame.with_size(w, h)),
            Err(e) => {
                debug!(path = %source.display(), error = %e, "Could not read image dimensions");
                Some(frame)
            }
        }
    }

    fn save_frame(&self, frame: &FrameInfo, path: &Path) -> Result<(), HostError> {
        let decoded = image::open(&frame.path)
            .map_err(|e| HostError::ExportFailed(format!("decode {}: {}", frame.path, e)))?;
        decoded
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| HostError::ExportFailed(format!("encode PNG: {}", e)))
    }
}
