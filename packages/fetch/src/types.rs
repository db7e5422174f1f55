use std::fmt;
use std::io::Read;
use std::time::Duration;

use url::Url;

use crate::Credentials;

/// One download request.
///
/// A zero `timeout` means "use the fetcher's default".
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a Url,
    pub credentials: Option<&'a Credentials>,
    pub timeout: Duration,
}

impl<'a> FetchRequest<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self {
            url,
            credentials: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<&'a Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A successful download: where it came from and a stream over the payload.
pub struct Fetched {
    /// Final path segment of the URL.
    pub name: String,
    /// The URL path as sent.
    pub path: String,
    pub body: Box<dyn Read + Send>,
}

impl Fetched {
    pub fn new(url: &Url, body: Box<dyn Read + Send>) -> Self {
        let (_, name) = split_url_path(url.path());
        Self {
            name,
            path: url.path().to_string(),
            body,
        }
    }
}

impl fmt::Debug for Fetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetched")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Split a URL path into its directory and final segment.
///
/// The directory never ends with a separator except for the root `/`.
pub fn split_url_path(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(idx) => {
            let dir = &path[..idx];
            let dir = if dir.is_empty() { "/" } else { dir };
            (dir.to_string(), path[idx + 1..].to_string())
        }
        None => ("/".to_string(), path.to_string()),
    }
}
