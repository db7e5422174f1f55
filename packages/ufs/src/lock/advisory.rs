use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use tracing::debug;

use super::{InstanceLock, LockStrategy};
use crate::{Error, Result};

/// Exclusive non-blocking `flock` on the lock file.
///
/// The file is opened without truncation so a live owner's record survives a
/// failed attempt; it is only truncated once the lock is ours.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryLock;

impl LockStrategy for AdvisoryLock {
    fn acquire(&self, path: &Path, record: &[u8]) -> Result<InstanceLock> {
        let shown = path.display().to_string();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .map_err(|e| Error::io(shown.as_str(), e))?;

        let mut lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => lock,
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                debug!(path = %path.display(), "lock held elsewhere");
                return Err(Error::LockHeld {
                    path: path.to_path_buf(),
                });
            }
            Err((_, errno)) => return Err(Error::io(shown, errno.into())),
        };

        let io_err = |e| Error::io(shown.as_str(), e);
        lock.set_len(0).map_err(io_err)?;
        lock.write_all(record).map_err(io_err)?;
        lock.flush().map_err(io_err)?;

        Ok(InstanceLock::flock(path, lock))
    }
}
