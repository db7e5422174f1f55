//! Single-instance lock files.
//!
//! A lock file holds a JSON record `{"pid": <owner>, "data": <payload>}`.
//! Two strategies exist with different guarantees:
//!
//! - [`AdvisoryLock`] (Unix default): a non-blocking exclusive `flock` on the
//!   open descriptor. The kernel drops the lock when the owner exits, so a
//!   stale file never blocks a new owner.
//! - [`ReplaceLock`] (default elsewhere): remove any existing file, then
//!   create it exclusively. Two racing processes can both succeed and a
//!   crashed owner leaves its file behind to be replaced.
//!
//! Acquisition never blocks; contention fails with [`Error::LockHeld`].

#[cfg(unix)]
mod advisory;
mod replace;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

#[cfg(unix)]
pub use advisory::AdvisoryLock;
pub use replace::ReplaceLock;

/// Contents of a lock file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRecord<T = serde_json::Value> {
    pub pid: u32,
    pub data: T,
}

/// A way of taking exclusive ownership of a lock file.
pub trait LockStrategy: Send + Sync {
    /// Take the lock at `path` and write `record` into it.
    fn acquire(&self, path: &Path, record: &[u8]) -> Result<InstanceLock>;
}

// Keeps whatever holds the lock alive for as long as the `InstanceLock`.
enum Guard {
    #[cfg(unix)]
    Flock(nix::fcntl::Flock<fs::File>),
    File(fs::File),
}

/// A held lock. Dropping it closes the descriptor and releases the lock.
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    guard: Guard,
}

impl InstanceLock {
    #[cfg(unix)]
    fn flock(path: &Path, lock: nix::fcntl::Flock<fs::File>) -> Self {
        Self {
            path: path.to_path_buf(),
            pid: std::process::id(),
            guard: Guard::Flock(lock),
        }
    }

    fn file(path: &Path, file: fs::File) -> Self {
        Self {
            path: path.to_path_buf(),
            pid: std::process::id(),
            guard: Guard::File(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The process that created the lock.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Release the lock now. The file itself stays on disk.
    pub fn release(self) -> Result<()> {
        debug!(path = %self.path.display(), "releasing lock");
        match self.guard {
            #[cfg(unix)]
            Guard::Flock(lock) => {
                let path = self.path;
                lock.unlock()
                    .map(drop)
                    .map_err(|(_, errno)| Error::io(path.display().to_string(), errno.into()))
            }
            Guard::File(file) => {
                drop(file);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLock")
            .field("path", &self.path)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// The strategy used by [`create_lock_file`] on this platform.
pub fn default_strategy() -> Box<dyn LockStrategy> {
    #[cfg(unix)]
    {
        Box::new(AdvisoryLock)
    }
    #[cfg(not(unix))]
    {
        Box::new(ReplaceLock)
    }
}

/// Take the single-instance lock at `path`, recording this process's PID and
/// `data`.
pub fn create_lock_file<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<InstanceLock> {
    create_lock_file_with(default_strategy().as_ref(), path, data)
}

pub fn create_lock_file_with<T: Serialize>(
    strategy: &dyn LockStrategy,
    path: impl AsRef<Path>,
    data: &T,
) -> Result<InstanceLock> {
    let path = path.as_ref();
    let record = LockRecord {
        pid: std::process::id(),
        data,
    };
    let bytes = serde_json::to_vec(&record).map_err(|source| Error::InvalidPayload {
        path: path.to_path_buf(),
        source,
    })?;

    let lock = strategy.acquire(path, &bytes)?;
    debug!(path = %path.display(), pid = lock.pid(), "acquired lock");
    Ok(lock)
}

/// Read the record stored in a lock file.
///
/// Only the content is checked; whether the recorded process is still alive
/// is up to the caller.
pub fn read_lock_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<LockRecord<T>> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::io(path.display().to_string(), e)
        }
    })?;

    serde_json::from_slice(&contents).map_err(|source| Error::InvalidPayload {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Owner {
        name: String,
        port: u16,
    }

    #[test]
    fn record_roundtrips_through_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");
        let owner = Owner {
            name: "server".to_string(),
            port: 8080,
        };

        let lock = create_lock_file(&path, &owner).unwrap();
        assert_eq!(lock.path(), path.as_path());
        assert_eq!(lock.pid(), std::process::id());

        let record: LockRecord<Owner> = read_lock_file(&path).unwrap();
        assert_eq!(record.pid, std::process::id());
        assert_eq!(record.data, owner);
    }

    #[test]
    fn record_has_exactly_pid_and_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");

        let _lock = create_lock_file(&path, &json!(["a", 1])).unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw, json!({"pid": std::process::id(), "data": ["a", 1]}));
    }

    #[test]
    fn malformed_record_is_invalid_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.lock");
        fs::write(&path, "12345").unwrap();

        let err = read_lock_file::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn missing_lock_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_lock_file::<serde_json::Value>(dir.path().join("none.lock")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn release_keeps_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");

        let lock = create_lock_file(&path, &()).unwrap();
        lock.release().unwrap();

        assert!(path.exists());
        let record: LockRecord<()> = read_lock_file(&path).unwrap();
        assert_eq!(record.pid, std::process::id());
    }
}
