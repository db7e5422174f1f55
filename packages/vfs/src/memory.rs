//! In-memory filesystem backend.
//!
//! Used for tests and sandboxes. All data is lost when the last handle is
//! dropped.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::traits::{DirEntry, Metadata, Vfs, VfsReader, VfsWriter};
use crate::VfsError;

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8>, modified: SystemTime },
    Directory { modified: SystemTime },
}

impl Node {
    fn directory() -> Self {
        Node::Directory {
            modified: SystemTime::now(),
        }
    }

    fn metadata(&self) -> Metadata {
        match self {
            Node::File { data, modified } => {
                Metadata::file(data.len() as u64).with_modified(*modified)
            }
            Node::Directory { modified } => Metadata::directory().with_modified(*modified),
        }
    }
}

/// Keys are normalized relative paths; the root is the empty path.
type Nodes = BTreeMap<PathBuf, Node>;

/// In-memory filesystem.
///
/// Thread-safe via an internal `RwLock`. Cloning a `MemFs` yields another
/// handle onto the same tree. Every path is resolved against `/`, so
/// `hello.txt` and `/hello.txt` name the same file. Creating a file creates
/// its missing parent directories.
#[derive(Debug, Clone)]
pub struct MemFs {
    nodes: Arc<RwLock<Nodes>>,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::new(), Node::directory());
        Self {
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Normalize a path: drop the root, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => result.push(s),
            }
        }
        result
    }

    fn read_nodes(&self) -> RwLockReadGuard<'_, Nodes> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, Nodes> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create every missing ancestor of `key` as a directory.
    fn ensure_parents(nodes: &mut Nodes, key: &Path, display: &Path) -> Result<(), VfsError> {
        let mut current = PathBuf::new();
        let parent = key.parent().unwrap_or(Path::new(""));
        for component in parent.components() {
            current.push(component);
            match nodes.get(&current) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(VfsError::NotADirectory {
                        path: display.to_path_buf(),
                    })
                }
                None => {
                    nodes.insert(current.clone(), Node::directory());
                }
            }
        }
        Ok(())
    }

    fn has_children(nodes: &Nodes, key: &Path) -> bool {
        nodes
            .keys()
            .any(|k| k.as_path() != key && k.parent() == Some(key))
    }
}

/// Writer that appends straight into the shared tree.
struct MemWriter {
    nodes: Arc<RwLock<Nodes>>,
    key: PathBuf,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        match nodes.get_mut(&self.key) {
            Some(Node::File { data, modified }) => {
                data.extend_from_slice(buf);
                *modified = SystemTime::now();
                Ok(buf.len())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file removed while open: /{}", self.key.display()),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Vfs for MemFs {
    fn open(&self, path: &Path) -> Result<VfsReader, VfsError> {
        let key = Self::normalize(path);
        match self.read_nodes().get(&key) {
            Some(Node::File { data, .. }) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory {
                path: path.to_path_buf(),
            }),
            None => Err(VfsError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn create(&self, path: &Path) -> Result<VfsWriter, VfsError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();

        if let Some(Node::Directory { .. }) = nodes.get(&key) {
            return Err(VfsError::IsADirectory {
                path: path.to_path_buf(),
            });
        }
        Self::ensure_parents(&mut nodes, &key, path)?;
        nodes.insert(
            key.clone(),
            Node::File {
                data: Vec::new(),
                modified: SystemTime::now(),
            },
        );

        Ok(Box::new(MemWriter {
            nodes: Arc::clone(&self.nodes),
            key,
        }))
    }

    fn stat(&self, path: &Path) -> Result<Metadata, VfsError> {
        let key = Self::normalize(path);
        self.read_nodes()
            .get(&key)
            .map(Node::metadata)
            .ok_or_else(|| VfsError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn remove(&self, path: &Path) -> Result<(), VfsError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();

        if key.as_os_str().is_empty() {
            return Err(VfsError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        match nodes.get(&key) {
            None => Err(VfsError::NotFound {
                path: path.to_path_buf(),
            }),
            Some(Node::Directory { .. }) if Self::has_children(&nodes, &key) => {
                Err(VfsError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::DirectoryNotEmpty,
                        "directory not empty",
                    ),
                })
            }
            Some(_) => {
                nodes.remove(&key);
                Ok(())
            }
        }
    }

    fn remove_all(&self, path: &Path) -> Result<(), VfsError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();
        // Path::starts_with matches whole components, so `/ab` survives
        // removal of `/a`.
        nodes.retain(|k, _| k.as_os_str().is_empty() || !k.starts_with(&key));
        Ok(())
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), VfsError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();

        let mut current = PathBuf::new();
        for component in key.components() {
            current.push(component);
            match nodes.get(&current) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(VfsError::NotADirectory {
                        path: path.to_path_buf(),
                    })
                }
                None => {
                    nodes.insert(current.clone(), Node::directory());
                }
            }
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, VfsError> {
        let key = Self::normalize(path);
        let nodes = self.read_nodes();

        match nodes.get(&key) {
            Some(Node::Directory { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(VfsError::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
            None => {
                return Err(VfsError::NotFound {
                    path: path.to_path_buf(),
                })
            }
        }

        let mut entries: Vec<DirEntry> = nodes
            .iter()
            .filter(|(k, _)| k.as_path() != key && k.parent() == Some(key.as_path()))
            .filter_map(|(k, node)| {
                let name = k.file_name()?.to_string_lossy().into_owned();
                Some(DirEntry {
                    name,
                    path: Path::new("/").join(k),
                    metadata: node.metadata(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        let from_key = Self::normalize(from);
        let to_key = Self::normalize(to);
        let mut nodes = self.write_nodes();

        if !nodes.contains_key(&from_key) {
            return Err(VfsError::NotFound {
                path: from.to_path_buf(),
            });
        }
        if from_key == to_key {
            return Ok(());
        }
        if from_key.as_os_str().is_empty() || to_key.starts_with(&from_key) {
            return Err(VfsError::PermissionDenied {
                path: from.to_path_buf(),
            });
        }
        Self::ensure_parents(&mut nodes, &to_key, to)?;

        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|k| k.starts_with(&from_key))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let suffix = old.strip_prefix(&from_key).unwrap_or(Path::new(""));
                nodes.insert(to_key.join(suffix), node);
            }
        }
        Ok(())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        Path::new("/").join(Self::normalize(path))
    }
}
