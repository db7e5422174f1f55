//! Core VFS trait and metadata types.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::VfsError;

/// Kind of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// FIFOs, sockets and device nodes.
    Other,
}

/// Metadata about a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub kind: EntryKind,
    /// Size in bytes (0 for directories and special files).
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Metadata {
    pub fn file(size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            size,
            modified: None,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            size: 0,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

impl From<std::fs::Metadata> for Metadata {
    fn from(meta: std::fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        Self {
            kind,
            size: if kind == EntryKind::File || kind == EntryKind::Symlink {
                meta.len()
            } else {
                0
            },
            modified: meta.modified().ok(),
        }
    }
}

/// A directory entry returned by [`Vfs::read_dir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// File/directory name (last component of `path`).
    pub name: String,
    /// Full path of the entry, as the backend renders it.
    pub path: PathBuf,
    pub metadata: Metadata,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }
}

/// Reader handle returned by [`Vfs::open`].
pub type VfsReader = Box<dyn Read + Send>;

/// Writer handle returned by [`Vfs::create`].
pub type VfsWriter = Box<dyn Write + Send>;

/// Abstract filesystem capability.
///
/// All methods are synchronous. Implementations decide how relative paths are
/// resolved; [`Vfs::absolute`] exposes that rule to callers that need to
/// render a path (for example to compute a containing directory).
pub trait Vfs: Send + Sync {
    /// Open a regular file for reading.
    ///
    /// Fails with [`VfsError::IsADirectory`] for directories.
    fn open(&self, path: &Path) -> Result<VfsReader, VfsError>;

    /// Create (or truncate) a file for writing.
    fn create(&self, path: &Path) -> Result<VfsWriter, VfsError>;

    /// Get metadata for a file or directory, following symlinks.
    fn stat(&self, path: &Path) -> Result<Metadata, VfsError>;

    /// Remove a file or an empty directory.
    fn remove(&self, path: &Path) -> Result<(), VfsError>;

    /// Remove a path and everything below it. Succeeds if nothing exists there.
    fn remove_all(&self, path: &Path) -> Result<(), VfsError>;

    /// Create a directory and all missing parents.
    fn mkdir_all(&self, path: &Path) -> Result<(), VfsError>;

    /// List the direct children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, VfsError>;

    /// Rename (move) a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError>;

    /// The absolute form of `path` under this backend's join rules.
    fn absolute(&self, path: &Path) -> PathBuf;

    /// Read the entire contents of a file.
    fn read(&self, path: &Path) -> Result<Vec<u8>, VfsError> {
        let mut reader = self.open(path)?;
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| VfsError::from_io(path, e))?;
        Ok(data)
    }

    /// Write `data` to a file, replacing any previous contents.
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), VfsError> {
        let mut writer = self.create(path)?;
        writer
            .write_all(data)
            .and_then(|_| writer.flush())
            .map_err(|e| VfsError::from_io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }
}

impl<T: Vfs + ?Sized> Vfs for Arc<T> {
    fn open(&self, path: &Path) -> Result<VfsReader, VfsError> {
        (**self).open(path)
    }

    fn create(&self, path: &Path) -> Result<VfsWriter, VfsError> {
        (**self).create(path)
    }

    fn stat(&self, path: &Path) -> Result<Metadata, VfsError> {
        (**self).stat(path)
    }

    fn remove(&self, path: &Path) -> Result<(), VfsError> {
        (**self).remove(path)
    }

    fn remove_all(&self, path: &Path) -> Result<(), VfsError> {
        (**self).remove_all(path)
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), VfsError> {
        (**self).mkdir_all(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, VfsError> {
        (**self).read_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        (**self).rename(from, to)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        (**self).absolute(path)
    }
}
