//! # ufs
//!
//! Uniform access to local and remote files, plus single-instance lock
//! files.
//!
//! A [`Ufs`] holds two injected capabilities: a [`Vfs`](ufs_vfs::Vfs) for
//! local paths and a [`Fetcher`](ufs_fetch::Fetcher) for remote URLs. Given a
//! URL it returns a [`File`]; `http`, `https`, `ftp`, `ftps`, `sftp` and `s3`
//! URLs are remote, everything else (optionally prefixed with `file://`) is
//! a local path.
//!
//! ```rust
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ufs::Ufs;
//! use ufs_fetch::SchemeRouter;
//! use ufs_vfs::{MemFs, Vfs};
//!
//! let fs = MemFs::new();
//! fs.write(Path::new("/etc/motd"), b"welcome").unwrap();
//!
//! let ufs = Ufs::new(Arc::new(fs), Arc::new(SchemeRouter::new()));
//! let text = ufs
//!     .download_text("file:///etc/motd", None, Duration::ZERO)
//!     .unwrap();
//! assert_eq!(text, "welcome");
//! ```
//!
//! ## Modules
//!
//! - [`paths`]: work-directory resolution and log-safe URL shortening
//! - [`lock`]: single-instance lock files
//! - [`fsutil`]: filesystem helpers over a `Vfs`
//! - [`platform`]: OS detection and well-known paths
//! - [`fatal`]: panic-on-error access for startup code

mod error;
pub mod fatal;
mod file;
pub mod fsutil;
mod local;
pub mod lock;
pub mod paths;
pub mod platform;
mod remote;
pub mod scheme;

pub use error::{Error, Expected, Result};
pub use fatal::OrFatal;
pub use file::{Content, File, Ufs};
pub use local::LocalFile;
pub use lock::{create_lock_file, read_lock_file, InstanceLock, LockRecord};
pub use paths::{short_description, work_dir};
pub use platform::{default_etc_hosts, Platform};
pub use remote::RemoteFile;
pub use scheme::{is_file_protocol, is_remote, strip_file_protocol, Scheme};

pub use ufs_fetch::{Credentials, FetchConfig};
