use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::warn;

use super::{InstanceLock, LockStrategy};
use crate::{Error, Result};

/// Remove any existing lock file, then create it exclusively.
///
/// Any existing file is treated as stale, even one whose owner is still
/// running, so this only detects a competitor that creates the file between
/// our remove and our create. A crashed owner leaves its file behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceLock;

impl LockStrategy for ReplaceLock {
    fn acquire(&self, path: &Path, record: &[u8]) -> Result<InstanceLock> {
        let shown = path.display().to_string();

        match fs::metadata(path) {
            Ok(_) => {
                warn!(path = %path.display(), "replacing existing lock file");
                fs::remove_file(path).map_err(|e| Error::io(shown.as_str(), e))?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(shown, e)),
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    Error::LockHeld {
                        path: path.to_path_buf(),
                    }
                } else {
                    Error::io(shown.as_str(), e)
                }
            })?;

        file.write_all(record)
            .and_then(|()| file.flush())
            .map_err(|e| Error::io(shown.as_str(), e))?;

        Ok(InstanceLock::file(path, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{create_lock_file_with, read_lock_file, LockRecord};
    use tempfile::TempDir;

    #[test]
    fn creates_a_fresh_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");

        let lock = create_lock_file_with(&ReplaceLock, &path, &"payload").unwrap();
        assert_eq!(lock.pid(), std::process::id());

        let record: LockRecord<String> = read_lock_file(&path).unwrap();
        assert_eq!(record.data, "payload");
    }

    #[test]
    fn leftover_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");
        fs::write(&path, r#"{"pid":1,"data":"crashed"}"#).unwrap();

        let _lock = create_lock_file_with(&ReplaceLock, &path, &"fresh").unwrap();
        let record: LockRecord<String> = read_lock_file(&path).unwrap();
        assert_eq!(record.data, "fresh");
    }

    // A live owner's file is replaced too; only the advisory strategy can
    // tell a live owner from a dead one.
    #[cfg(unix)]
    #[test]
    fn live_owner_is_not_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");

        let _first = create_lock_file_with(&ReplaceLock, &path, &"first").unwrap();
        let _second = create_lock_file_with(&ReplaceLock, &path, &"second").unwrap();

        let record: LockRecord<String> = read_lock_file(&path).unwrap();
        assert_eq!(record.data, "second");
    }
}
