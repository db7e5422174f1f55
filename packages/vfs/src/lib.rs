//! # ufs-vfs
//!
//! Virtual filesystem capability for ufs.
//!
//! The [`Vfs`] trait is the narrow waist between ufs and storage. It covers
//! exactly what the file adapters and helpers need: open, create, stat,
//! remove, remove-recursive, make-directories, list and rename, with errors
//! that keep not-found, is-a-directory and permission failures apart.
//!
//! ## Backends
//!
//! - [`OsFs`]: the host filesystem through `std::fs`
//! - [`MemFs`]: an in-memory tree for tests and sandboxes
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use ufs_vfs::{MemFs, Vfs};
//!
//! let fs = MemFs::new();
//! fs.write(Path::new("/etc/hosts"), b"127.0.0.1 localhost").unwrap();
//! assert!(fs.stat(Path::new("/etc")).unwrap().is_dir());
//! ```

mod clean;
mod error;
mod memory;
mod os;
mod traits;

pub use clean::clean_path;
pub use error::VfsError;
pub use memory::MemFs;
pub use os::OsFs;
pub use traits::{DirEntry, EntryKind, Metadata, Vfs, VfsReader, VfsWriter};
