use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use ufs_fetch::{split_url_path, Credentials, FetchRequest, Fetcher};
use url::Url;

use crate::file::{Content, File};
use crate::paths::short_description;
use crate::{Error, Result};

/// A file reached through the injected fetch capability.
pub struct RemoteFile {
    fetcher: Arc<dyn Fetcher>,
    url: String,
    parsed: Url,
    name: String,
    dir: String,
    credentials: Option<Arc<Credentials>>,
    timeout: Duration,
}

impl RemoteFile {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        url: &str,
        credentials: Option<Arc<Credentials>>,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: short_description(url),
            source,
        })?;
        let (dir, name) = split_url_path(parsed.path());

        Ok(Self {
            fetcher,
            url: url.to_string(),
            parsed,
            name,
            dir,
            credentials,
            timeout,
        })
    }
}

impl File for RemoteFile {
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
        Some(&self.parsed)
    }

    fn protocol(&self) -> &str {
        self.parsed.scheme()
    }

    fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_remote(&self) -> bool {
        true
    }

    /// Streams the response body; nothing is buffered here and failures are
    /// not retried.
    fn download(&self) -> Result<Content> {
        debug!(
            url = %short_description(&self.url),
            timeout_ms = self.timeout.as_millis() as u64,
            "downloading"
        );

        let request = FetchRequest::new(&self.parsed)
            .with_credentials(self.credentials.as_deref())
            .with_timeout(self.timeout);

        let fetched = self
            .fetcher
            .fetch(&request)
            .map_err(|e| Error::from_fetch(&self.url, e))?;

        Ok(Content {
            name: fetched.name,
            path: fetched.path,
            blob: fetched.body,
        })
    }
}

impl fmt::Debug for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFile")
            .field("url", &short_description(&self.url))
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
