use std::fs;
use std::io;
use std::path::Path;

/// Read-only access to the bytes behind resolved paths.
///
/// The handler never touches the filesystem except through this trait.
pub trait FileSource: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl FileSource for DiskSource {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
