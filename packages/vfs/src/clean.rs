//! Lexical path cleaning.

use std::path::{Component, Path, PathBuf};

/// The shortest path lexically equivalent to `path`.
///
/// `.` segments and trailing separators disappear and `..` consumes the
/// segment before it. A `..` directly under the root is dropped; leading
/// `..` segments of a relative path are kept. The filesystem is never
/// consulted, so symlinks are not resolved. An empty result is `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut kept: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match kept.last() {
                Some(Component::Normal(_)) => {
                    kept.pop();
                }
                Some(Component::RootDir) => {}
                _ => kept.push(component),
            },
            other => kept.push(other),
        }
    }

    if kept.is_empty() {
        return PathBuf::from(".");
    }
    kept.into_iter().collect()
}
