//! Real filesystem backend.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::clean::clean_path;
use crate::traits::{DirEntry, Metadata, Vfs, VfsReader, VfsWriter};
use crate::VfsError;

/// The host operating system's filesystem, accessed through `std::fs`.
///
/// Relative paths resolve against the process working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        Self
    }
}

impl Vfs for OsFs {
    fn open(&self, path: &Path) -> Result<VfsReader, VfsError> {
        // File::open succeeds on directories on Unix; reject them up front so
        // callers get the same error from every backend.
        if self.stat(path)?.is_dir() {
            return Err(VfsError::IsADirectory {
                path: path.to_path_buf(),
            });
        }
        let file = fs::File::open(path).map_err(|e| VfsError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> Result<VfsWriter, VfsError> {
        let file = fs::File::create(path).map_err(|e| VfsError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn stat(&self, path: &Path) -> Result<Metadata, VfsError> {
        fs::metadata(path)
            .map(Metadata::from)
            .map_err(|e| VfsError::from_io(path, e))
    }

    fn remove(&self, path: &Path) -> Result<(), VfsError> {
        let result = if self.stat(path)?.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| VfsError::from_io(path, e))
    }

    fn remove_all(&self, path: &Path) -> Result<(), VfsError> {
        let result = match self.stat(path) {
            Ok(meta) if meta.is_dir() => {
                debug!(path = %path.display(), "removing directory tree");
                fs::remove_dir_all(path)
            }
            Ok(_) => fs::remove_file(path),
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        result.map_err(|e| VfsError::from_io(path, e))
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), VfsError> {
        fs::create_dir_all(path).map_err(|e| VfsError::from_io(path, e))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, VfsError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| VfsError::from_io(path, e))? {
            let entry = entry.map_err(|e| VfsError::from_io(path, e))?;
            let entry_path = entry.path();
            // Follow symlinks like `stat` does; fall back to the link itself
            // when the target is dangling.
            let metadata = match fs::metadata(&entry_path) {
                Ok(meta) => meta,
                Err(_) => entry
                    .metadata()
                    .map_err(|e| VfsError::from_io(&entry_path, e))?,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry_path,
                metadata: metadata.into(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(path = %path.display(), count = entries.len(), "read dir");
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        fs::rename(from, to).map_err(|e| VfsError::from_io(from, e))
    }

    /// Joins relative paths onto the current directory and folds `.` and
    /// `..` lexically.
    fn absolute(&self, path: &Path) -> PathBuf {
        let joined = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        clean_path(&joined)
    }
}
