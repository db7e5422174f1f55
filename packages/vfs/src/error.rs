//! Error types for the VFS layer.
//!
//! Errors at this level only describe what happened to a path. Semantic
//! errors ("expected a file, found a directory" in the caller's sense) belong
//! in higher layers.

use std::io;
use std::path::{Path, PathBuf};

/// Errors returned by [`Vfs`](crate::Vfs) backends.
///
/// Every variant carries the path the operation was attempted on.
#[derive(thiserror::Error, Debug)]
pub enum VfsError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("is a directory: {}", path.display())]
    IsADirectory { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VfsError {
    /// Classify an `io::Error` raised while operating on `path`.
    pub fn from_io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound { path },
            io::ErrorKind::IsADirectory => VfsError::IsADirectory { path },
            io::ErrorKind::NotADirectory => VfsError::NotADirectory { path },
            io::ErrorKind::PermissionDenied => VfsError::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => VfsError::AlreadyExists { path },
            _ => VfsError::Io {
                path,
                source: error,
            },
        }
    }

    /// The path the failed operation was applied to.
    pub fn path(&self) -> &Path {
        match self {
            VfsError::NotFound { path }
            | VfsError::IsADirectory { path }
            | VfsError::NotADirectory { path }
            | VfsError::PermissionDenied { path }
            | VfsError::AlreadyExists { path }
            | VfsError::Io { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }

    /// The closest `io::ErrorKind` for this error.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            VfsError::NotFound { .. } => io::ErrorKind::NotFound,
            VfsError::IsADirectory { .. } => io::ErrorKind::IsADirectory,
            VfsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            VfsError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            VfsError::AlreadyExists { .. } => io::ErrorKind::AlreadyExists,
            VfsError::Io { source, .. } => source.kind(),
        }
    }
}

impl From<VfsError> for io::Error {
    fn from(error: VfsError) -> Self {
        io::Error::new(error.kind(), error)
    }
}
