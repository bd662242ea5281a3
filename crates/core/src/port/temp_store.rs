// Temp File Store Port
// Unique temporary image files owned by a single print job

use std::io;
use std::path::{Path, PathBuf};

/// Allocates and deletes the temporary PNG handed to the OS print tool
pub trait TempStore: Send + Sync {
    /// Create a new, uniquely named, empty `.png` file and return its path
    fn allocate(&self) -> io::Result<PathBuf>;

    /// Delete a file previously returned by `allocate`
    fn remove(&self, path: &Path) -> io::Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory temp store that records every allocation and removal
    #[derive(Default)]
    pub struct MockTempStore {
        allocated: Mutex<Vec<PathBuf>>,
        removed: Mutex<Vec<PathBuf>>,
        fail_allocate: bool,
        fail_remove: bool,
    }

    impl MockTempStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_allocate() -> Self {
            Self {
                fail_allocate: true,
                ..Self::default()
            }
        }

        /// Removal fails as if the file were locked by a viewer
        pub fn failing_remove() -> Self {
            Self {
                fail_remove: true,
                ..Self::default()
            }
        }

        pub fn allocated(&self) -> Vec<PathBuf> {
            self.allocated.lock().unwrap().clone()
        }

        /// Every removal attempt, successful or not
        pub fn removed(&self) -> Vec<PathBuf> {
            self.removed.lock().unwrap().clone()
        }
    }

    impl TempStore for MockTempStore {
        fn allocate(&self) -> io::Result<PathBuf> {
            if self.fail_allocate {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "temp dir not writable"));
            }
            let mut allocated = self.allocated.lock().unwrap();
            let path = PathBuf::from(format!("/tmp/frameprint_mock{}.png", allocated.len()));
            allocated.push(path.clone());
            Ok(path)
        }

        fn remove(&self, path: &Path) -> io::Result<()> {
            self.removed.lock().unwrap().push(path.to_path_buf());
            if self.fail_remove {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "file in use"))
            } else {
                Ok(())
            }
        }
    }
}
