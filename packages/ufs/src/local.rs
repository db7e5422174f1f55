use std::fmt;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use ufs_fetch::Credentials;
use ufs_vfs::Vfs;
use url::Url;

use crate::error::Expected;
use crate::file::{Content, File};
use crate::{Error, Result};

const PROTOCOL: &str = "file";

/// A file on the injected filesystem.
pub struct LocalFile {
    vfs: Arc<dyn Vfs>,
    path: String,
    name: String,
    dir: String,
    url: String,
    parsed: Option<Url>,
    credentials: Option<Arc<Credentials>>,
    timeout: Duration,
}

impl LocalFile {
    /// `path` must already be free of any `file://` prefix.
    pub fn new(
        vfs: Arc<dyn Vfs>,
        path: &str,
        credentials: Option<Arc<Credentials>>,
        timeout: Duration,
    ) -> Self {
        let as_path = Path::new(path);
        let name = as_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let absolute = vfs.absolute(as_path);
        let dir = absolute
            .parent()
            .unwrap_or(&absolute)
            .display()
            .to_string();
        let parsed = Url::from_file_path(&absolute).ok();

        Self {
            vfs,
            path: path.to_string(),
            name,
            dir,
            url: format!("file://{path}"),
            parsed,
            credentials,
            timeout,
        }
    }

    /// The path as given, without the `file://` prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The filesystem this file lives on.
    pub fn vfs(&self) -> &Arc<dyn Vfs> {
        &self.vfs
    }
}

impl File for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn dir(&self) -> &str {
        &self.dir
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn parsed_url(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    fn protocol(&self) -> &str {
        PROTOCOL
    }

    fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_remote(&self) -> bool {
        false
    }

    /// Reads the whole file and closes it before returning, so the content
    /// stream never holds a filesystem handle.
    fn download(&self) -> Result<Content> {
        let path = Path::new(&self.path);

        // Only regular files; a FIFO or device may never reach EOF.
        let metadata = self.vfs.stat(path)?;
        if !metadata.is_file() {
            return Err(Error::WrongType {
                path: self.path.clone(),
                expected: Expected::File,
            });
        }

        let mut buffer = Vec::with_capacity(metadata.size as usize);
        {
            let mut reader = self.vfs.open(path)?;
            reader
                .read_to_end(&mut buffer)
                .map_err(|e| Error::io(self.path.as_str(), e))?;
        }

        debug!(path = %self.path, bytes = buffer.len(), "read local file");

        Ok(Content {
            name: self.name.clone(),
            path: self.path.clone(),
            blob: Box::new(Cursor::new(buffer)),
        })
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("path", &self.path)
            .field("dir", &self.dir)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ufs_vfs::MemFs;

    fn local(fs: &MemFs, path: &str) -> LocalFile {
        LocalFile::new(Arc::new(fs.clone()), path, None, Duration::ZERO)
    }

    #[test]
    fn attributes_come_from_the_path() {
        let fs = MemFs::new();
        let file = local(&fs, "/hello/world/test.txt");

        assert_eq!(file.name(), "test.txt");
        assert_eq!(file.dir(), "/hello/world");
        assert_eq!(file.url(), "file:///hello/world/test.txt");
        assert_eq!(file.protocol(), "file");
        assert_eq!(file.path(), "/hello/world/test.txt");
        assert!(file.credentials().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn parsed_url_points_at_the_absolute_path() {
        let fs = MemFs::new();
        let file = local(&fs, "notes/../today.md");

        let url = file.parsed_url().unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.path(), "/today.md");
        assert_eq!(url.to_file_path().unwrap(), Path::new("/today.md"));
    }

    #[test]
    fn relative_paths_get_an_absolute_dir() {
        let fs = MemFs::new();
        let file = local(&fs, "notes/today.md");
        assert_eq!(file.dir(), "/notes");
        assert_eq!(file.url(), "file://notes/today.md");
    }

    #[test]
    fn download_returns_the_bytes() {
        let fs = MemFs::new();
        fs.write(Path::new("/hello/world/test.txt"), b"hello, world")
            .unwrap();

        let content = local(&fs, "/hello/world/test.txt").download().unwrap();
        assert_eq!(content.name, "test.txt");
        assert_eq!(content.path, "/hello/world/test.txt");
        assert_eq!(content.into_bytes().unwrap(), b"hello, world");
    }

    #[test]
    fn content_outlives_the_file() {
        let fs = MemFs::new();
        fs.write(Path::new("/a.txt"), b"first").unwrap();

        let content = local(&fs, "/a.txt").download().unwrap();
        fs.write(Path::new("/a.txt"), b"second").unwrap();

        assert_eq!(content.into_text().unwrap(), "first");
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = MemFs::new();
        let err = local(&fs, "/nope.txt").download().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn directory_is_wrong_type() {
        let fs = MemFs::new();
        fs.mkdir_all(Path::new("/etc")).unwrap();

        let err = local(&fs, "/etc").download().unwrap_err();
        assert!(matches!(
            err,
            Error::WrongType {
                expected: Expected::File,
                ..
            }
        ));
    }

    #[test]
    fn exposes_its_filesystem() {
        let fs = MemFs::new();
        let file = local(&fs, "/x/y.txt");
        file.vfs().write(Path::new("/x/y.txt"), b"via handle").unwrap();

        assert_eq!(file.download().unwrap().into_text().unwrap(), "via handle");
    }
}
