//! The file contract and the facade that picks an adapter per URL.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use ufs_fetch::{Credentials, FetchConfig, Fetcher, SchemeRouter};
use ufs_vfs::{OsFs, Vfs};
use url::Url;

use crate::local::LocalFile;
use crate::paths::short_description;
use crate::remote::RemoteFile;
use crate::scheme::{is_remote, strip_file_protocol};
use crate::{Error, Result};

/// A local or remote file addressed by URL.
///
/// Implementations are immutable after construction; every attribute is
/// computed once from the URL.
pub trait File: fmt::Debug + Send + Sync {
    /// Final path segment.
    fn name(&self) -> &str;

    /// Containing directory: absolute for local files, the URL path
    /// remainder for remote ones.
    fn dir(&self) -> &str;

    /// Canonical protocol-prefixed URL.
    fn url(&self) -> &str;

    /// The URL in parsed form. Local files get a `file:` URL for their
    /// absolute path, or `None` when the path cannot be expressed as one.
    fn parsed_url(&self) -> Option<&Url>;

    /// `file` for local files, otherwise the URL scheme.
    fn protocol(&self) -> &str;

    fn credentials(&self) -> Option<&Credentials>;

    /// Zero means the transport default.
    fn timeout(&self) -> Duration;

    fn is_remote(&self) -> bool;

    /// Open the file for reading.
    ///
    /// The returned [`Content`] owns an open stream; dropping it releases
    /// the stream.
    fn download(&self) -> Result<Content>;
}

/// A download result: where it came from and an open stream over the bytes.
pub struct Content {
    pub name: String,
    /// The local path, or the URL path component for remote files.
    pub path: String,
    pub blob: Box<dyn Read + Send>,
}

impl Content {
    /// Read the stream to the end.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.blob
            .read_to_end(&mut bytes)
            .map_err(|e| Error::io(self.path.as_str(), e))?;
        Ok(bytes)
    }

    /// Read the stream to the end as UTF-8.
    pub fn into_text(mut self) -> Result<String> {
        let mut text = String::new();
        self.blob
            .read_to_string(&mut text)
            .map_err(|e| Error::io(self.path.as_str(), e))?;
        Ok(text)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Entry point: holds the filesystem and fetch capabilities and hands out
/// [`File`]s for URLs.
#[derive(Clone)]
pub struct Ufs {
    vfs: Arc<dyn Vfs>,
    fetcher: Arc<dyn Fetcher>,
}

impl Ufs {
    pub fn new(vfs: Arc<dyn Vfs>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { vfs, fetcher }
    }

    /// The host filesystem plus http/https, configured from the environment.
    pub fn os() -> Result<Self> {
        let config = FetchConfig::from_env().map_err(Error::Config)?;
        Self::with_config(&config)
    }

    /// The host filesystem plus http/https with an explicit configuration.
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let router = SchemeRouter::with_defaults(config).map_err(Error::Config)?;
        Ok(Self::new(Arc::new(OsFs), Arc::new(router)))
    }

    pub fn vfs(&self) -> &Arc<dyn Vfs> {
        &self.vfs
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Resolve `url` to a remote or local file.
    ///
    /// Anything that is not one of the remote schemes is a local path, with an
    /// optional `file://` prefix.
    pub fn file(
        &self,
        url: &str,
        credentials: Option<Arc<Credentials>>,
        timeout: Duration,
    ) -> Result<Box<dyn File>> {
        if is_remote(url) {
            debug!(url = %short_description(url), "resolved remote file");
            let file = RemoteFile::new(self.fetcher.clone(), url, credentials, timeout)?;
            Ok(Box::new(file))
        } else {
            let path = strip_file_protocol(url);
            debug!(path, "resolved local file");
            Ok(Box::new(LocalFile::new(
                self.vfs.clone(),
                path,
                credentials,
                timeout,
            )))
        }
    }

    pub fn download_bytes(
        &self,
        url: &str,
        credentials: Option<Arc<Credentials>>,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        self.file(url, credentials, timeout)?.download()?.into_bytes()
    }

    pub fn download_text(
        &self,
        url: &str,
        credentials: Option<Arc<Credentials>>,
        timeout: Duration,
    ) -> Result<String> {
        self.file(url, credentials, timeout)?.download()?.into_text()
    }
}

impl fmt::Debug for Ufs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ufs").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use ufs_fetch::mock::MockFetcher;
    use ufs_fetch::FetchErrorKind;
    use ufs_vfs::MemFs;

    fn ufs_with(fs: MemFs, fetcher: MockFetcher) -> Ufs {
        Ufs::new(Arc::new(fs), Arc::new(fetcher))
    }

    #[test]
    fn local_urls_resolve_to_local_files() {
        let ufs = ufs_with(MemFs::new(), MockFetcher::new());

        let file = ufs
            .file("/hello/world/test.txt", None, Duration::ZERO)
            .unwrap();
        assert!(!file.is_remote());
        assert_eq!(file.name(), "test.txt");
        assert_eq!(file.dir(), "/hello/world");
        assert_eq!(file.url(), "file:///hello/world/test.txt");
        assert_eq!(file.protocol(), "file");

        let file = ufs
            .file("file:///hello/world/test.txt", None, Duration::ZERO)
            .unwrap();
        assert_eq!(file.url(), "file:///hello/world/test.txt");
        assert_eq!(file.dir(), "/hello/world");
    }

    #[test]
    fn remote_urls_resolve_to_remote_files() {
        let ufs = ufs_with(MemFs::new(), MockFetcher::new());
        let creds = Arc::new(Credentials::basic("u", "p"));

        let file = ufs
            .file(
                "https://ftp.debian.org/debian/README.mirrors.txt",
                Some(creds),
                Duration::from_secs(5),
            )
            .unwrap();
        assert!(file.is_remote());
        assert_eq!(file.name(), "README.mirrors.txt");
        assert_eq!(file.dir(), "/debian");
        assert_eq!(file.protocol(), "https");
        assert_eq!(
            file.url(),
            "https://ftp.debian.org/debian/README.mirrors.txt"
        );
        assert_eq!(file.credentials().and_then(|c| c.user.as_deref()), Some("u"));
        assert_eq!(file.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn local_bytes_match_for_bare_and_file_urls() {
        let fs = MemFs::new();
        fs.write(Path::new("/data/blob.bin"), &[0, 159, 146, 150])
            .unwrap();
        let ufs = ufs_with(fs, MockFetcher::new());

        let bare = ufs
            .download_bytes("/data/blob.bin", None, Duration::ZERO)
            .unwrap();
        let prefixed = ufs
            .download_bytes("file:///data/blob.bin", None, Duration::ZERO)
            .unwrap();

        assert_eq!(bare, vec![0, 159, 146, 150]);
        assert_eq!(prefixed, bare);
    }

    #[test]
    fn download_text_reads_remote_content() {
        let fetcher = MockFetcher::new().with_body("http://example.com/motd.txt", "hello");
        let ufs = ufs_with(MemFs::new(), fetcher);

        let text = ufs
            .download_text("http://example.com/motd.txt", None, Duration::ZERO)
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn download_text_rejects_invalid_utf8() {
        let fs = MemFs::new();
        fs.write(Path::new("/bad.txt"), &[0xff, 0xfe]).unwrap();
        let ufs = ufs_with(fs, MockFetcher::new());

        let err = ufs
            .download_text("/bad.txt", None, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn remote_failures_are_classified() {
        let fetcher = MockFetcher::new()
            .with_failure("https://h/slow", FetchErrorKind::Timeout)
            .with_failure("https://h/private", FetchErrorKind::Auth)
            .with_failure("https://h/flaky", FetchErrorKind::Network);
        let ufs = ufs_with(MemFs::new(), fetcher);
        let fetch = |url: &str| ufs.download_bytes(url, None, Duration::ZERO).unwrap_err();

        assert!(matches!(fetch("https://h/slow"), Error::Timeout { .. }));
        assert!(matches!(fetch("https://h/private"), Error::Auth { .. }));
        assert!(matches!(fetch("https://h/flaky"), Error::Network { .. }));
        assert!(matches!(fetch("https://h/missing"), Error::NotFound { .. }));
    }

    #[test]
    fn exotic_local_paths_are_accepted() {
        let ufs = ufs_with(MemFs::new(), MockFetcher::new());
        let file = ufs.file("gopher://not/a/scheme", None, Duration::ZERO).unwrap();
        assert!(!file.is_remote());
        assert_eq!(file.name(), "scheme");
    }
}
