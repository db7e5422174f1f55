//! Convenience helpers over a [`Vfs`].
//!
//! Existence checks are strict about entry kinds: asking whether a directory
//! "file exists" is an error rather than `false`.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use ufs_vfs::{Metadata, Vfs, VfsError};
use uuid::Uuid;

use crate::error::Expected;
use crate::{Error, Result};

const TEMP_FILE_ATTEMPTS: usize = 3;

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Metadata for `path`, or `None` when it does not exist and
/// `ensure_exists` is false.
pub fn stat(fs: &dyn Vfs, path: &Path, ensure_exists: bool) -> Result<Option<Metadata>> {
    match fs.stat(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(VfsError::NotFound { .. }) if !ensure_exists => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether a regular file exists at `path`. A directory there is an error.
pub fn file_exists(fs: &dyn Vfs, path: &Path) -> Result<bool> {
    match stat(fs, path, false)? {
        None => Ok(false),
        Some(metadata) if metadata.is_dir() => Err(Error::WrongType {
            path: display(path),
            expected: Expected::File,
        }),
        Some(_) => Ok(true),
    }
}

pub fn ensure_file_exists(fs: &dyn Vfs, path: &Path) -> Result<()> {
    if file_exists(fs, path)? {
        Ok(())
    } else {
        Err(Error::NotFound {
            path: display(path),
        })
    }
}

/// Whether a directory exists at `path`. A file there is an error.
pub fn dir_exists(fs: &dyn Vfs, path: &Path) -> Result<bool> {
    match stat(fs, path, false)? {
        None => Ok(false),
        Some(metadata) if !metadata.is_dir() => Err(Error::WrongType {
            path: display(path),
            expected: Expected::Directory,
        }),
        Some(_) => Ok(true),
    }
}

pub fn ensure_dir_exists(fs: &dyn Vfs, path: &Path) -> Result<()> {
    if dir_exists(fs, path)? {
        Ok(())
    } else {
        Err(Error::NotFound {
            path: display(path),
        })
    }
}

/// Copy `path` to `new_path`, returning the number of bytes copied.
pub fn copy_file(fs: &dyn Vfs, path: &Path, new_path: &Path) -> Result<u64> {
    ensure_file_exists(fs, path)?;

    let mut src = fs.open(path)?;
    let mut dst = fs.create(new_path)?;
    let copied = io::copy(&mut src, &mut dst).map_err(|e| Error::io(display(new_path), e))?;
    dst.flush().map_err(|e| Error::io(display(new_path), e))?;

    debug!(from = %path.display(), to = %new_path.display(), bytes = copied, "copied file");
    Ok(copied)
}

pub fn rename(fs: &dyn Vfs, path: &Path, new_path: &Path) -> Result<()> {
    fs.rename(path, new_path)?;
    Ok(())
}

/// Remove the file at `path` if there is one.
pub fn remove_file(fs: &dyn Vfs, path: &Path) -> Result<()> {
    if file_exists(fs, path)? {
        fs.remove(path)?;
    }
    Ok(())
}

/// Remove the directory at `path` and everything below it, if it exists.
/// The filesystem root is refused.
pub fn remove_dir(fs: &dyn Vfs, path: &Path) -> Result<()> {
    let raw = path.as_os_str();
    if raw == "/" || raw == "\\" {
        return Err(Error::InvalidPath {
            path: display(path),
            reason: "refusing to remove the root directory".to_string(),
        });
    }

    if dir_exists(fs, path)? {
        fs.remove_all(path)?;
        debug!(path = %path.display(), "removed directory");
    }
    Ok(())
}

pub fn read_bytes(fs: &dyn Vfs, path: &Path) -> Result<Vec<u8>> {
    Ok(fs.read(path)?)
}

pub fn read_text(fs: &dyn Vfs, path: &Path) -> Result<String> {
    let bytes = read_bytes(fs, path)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::io(display(path), io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Lines of a text file, without their terminators.
pub fn read_lines(fs: &dyn Vfs, path: &Path) -> Result<Vec<String>> {
    ensure_file_exists(fs, path)?;
    Ok(read_text(fs, path)?.lines().map(str::to_string).collect())
}

pub fn write(fs: &dyn Vfs, path: &Path, content: &[u8]) -> Result<()> {
    fs.write(path, content)?;
    Ok(())
}

pub fn write_text(fs: &dyn Vfs, path: &Path, content: &str) -> Result<()> {
    write(fs, path, content.as_bytes())
}

/// Write `lines` joined with `\n`, without a trailing newline.
pub fn write_lines<S: AsRef<str>>(fs: &dyn Vfs, path: &Path, lines: &[S]) -> Result<()> {
    let mut joined = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            joined.push('\n');
        }
        joined.push_str(line.as_ref());
    }
    write_text(fs, path, &joined)
}

/// Write `content` unless a file already exists. Returns whether it wrote.
pub fn write_if_not_found(fs: &dyn Vfs, path: &Path, content: &[u8]) -> Result<bool> {
    if file_exists(fs, path)? {
        return Ok(false);
    }
    write(fs, path, content)?;
    Ok(true)
}

pub fn write_text_if_not_found(fs: &dyn Vfs, path: &Path, content: &str) -> Result<bool> {
    write_if_not_found(fs, path, content.as_bytes())
}

pub fn write_lines_if_not_found<S: AsRef<str>>(
    fs: &dyn Vfs,
    path: &Path,
    lines: &[S],
) -> Result<bool> {
    if file_exists(fs, path)? {
        return Ok(false);
    }
    write_lines(fs, path, lines)?;
    Ok(true)
}

/// Create an empty file with a unique name in the system temp directory and
/// return its path. The last `*` in `pattern` marks where the random part
/// goes; without one it is appended.
pub fn temp_file(fs: &dyn Vfs, pattern: &str) -> Result<PathBuf> {
    let (prefix, suffix) = match pattern.rfind('*') {
        Some(idx) => (&pattern[..idx], &pattern[idx + 1..]),
        None => (pattern, ""),
    };
    if pattern.contains(std::path::is_separator) {
        return Err(Error::InvalidPath {
            path: pattern.to_string(),
            reason: "temp file pattern contains a path separator".to_string(),
        });
    }

    let dir = std::env::temp_dir();
    for _ in 0..TEMP_FILE_ATTEMPTS {
        let candidate = dir.join(format!("{prefix}{}{suffix}", Uuid::new_v4().simple()));
        if fs.exists(&candidate) {
            continue;
        }
        fs.write(&candidate, b"")?;
        debug!(path = %candidate.display(), "created temp file");
        return Ok(candidate);
    }

    Err(Error::io(
        display(&dir),
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no unused temp file name for {pattern:?}"),
        ),
    ))
}

/// [`temp_file`] holding `content`.
pub fn temp_text_file(fs: &dyn Vfs, pattern: &str, content: &str) -> Result<PathBuf> {
    let path = temp_file(fs, pattern)?;
    write_text(fs, &path, content)?;
    Ok(path)
}

/// Create `path` and any missing parents.
pub fn mkdir(fs: &dyn Vfs, path: &Path) -> Result<()> {
    fs.mkdir_all(path)?;
    Ok(())
}

/// Regular files in `dir` whose name ends with `suffix`, keyed by the name
/// with the suffix removed. A file named exactly `suffix` is skipped, as are
/// empty files when `skip_empty` is set.
pub fn list_suffixed(
    fs: &dyn Vfs,
    dir: &Path,
    suffix: &str,
    skip_empty: bool,
) -> Result<BTreeMap<String, PathBuf>> {
    let mut found = BTreeMap::new();

    for entry in fs.read_dir(dir)? {
        if !entry.is_file() || (skip_empty && entry.metadata.size == 0) {
            continue;
        }
        let Some(title) = entry.name.strip_suffix(suffix) else {
            continue;
        };
        if title.is_empty() {
            continue;
        }
        found.insert(title.to_string(), dir.join(&entry.name));
    }

    Ok(found)
}

/// File name without its last extension: `/a/b/notes.tar.gz` → `notes.tar`.
pub fn extract_title(path: impl AsRef<Path>) -> String {
    let base = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.rfind('.') {
        Some(idx) => base[..idx].to_string(),
        None => base,
    }
}

pub fn user_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::NotFound {
        path: "home directory".to_string(),
    })
}

/// Replace a leading `~` with the user's home directory.
///
/// `~user` forms are not supported.
pub fn expand_home_path(path: &str) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    if rest.is_empty() {
        return user_home_dir();
    }

    match rest.strip_prefix(['/', '\\']) {
        Some(rest) => Ok(user_home_dir()?.join(rest)),
        None => Err(Error::InvalidPath {
            path: path.to_string(),
            reason: "cannot expand user-specific home directories".to_string(),
        }),
    }
}
