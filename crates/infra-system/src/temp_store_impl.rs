// Filesystem temp store
// reason: tempfile for collision-free names without hand-rolled randomness
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use frameprint_core::application::worker::constants::{TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};
use frameprint_core::port::TempStore;

/// Creates `frameprint_XXXXXX.png` files that outlive their handle.
///
/// Files are kept on disk after `allocate`; deletion is the print worker's job.
#[derive(Debug, Clone, Default)]
pub struct FsTempStore {
    dir: Option<PathBuf>,
}

impl FsTempStore {
    /// Use the OS temp directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

impl TempStore for FsTempStore {
    fn allocate(&self) -> io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_FILE_PREFIX).suffix(TEMP_FILE_SUFFIX);

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        // Close the handle and disable delete-on-drop; the path is handed to the host
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        debug!(path = %path.display(), "Allocated temporary image file");
        Ok(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
