//! URL classification.
//!
//! A URL is remote when it starts with one of the [`Scheme`] prefixes followed
//! by `://`, compared case-insensitively. Everything else is a local path;
//! `file://` is an optional explicit marker for one.

use std::fmt;

const FILE_PREFIX: &str = "file://";

/// Network schemes that select the remote adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    Ftp,
    Ftps,
    Sftp,
    S3,
}

impl Scheme {
    pub const ALL: [Scheme; 6] = [
        Scheme::Http,
        Scheme::Https,
        Scheme::Ftp,
        Scheme::Ftps,
        Scheme::Sftp,
        Scheme::S3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
            Scheme::Ftps => "ftps",
            Scheme::Sftp => "sftp",
            Scheme::S3 => "s3",
        }
    }

    fn matches(&self, url: &str) -> bool {
        let name = self.as_str();
        has_prefix_ignore_case(url, name)
            && url.get(name.len()..).is_some_and(|rest| rest.starts_with("://"))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// The network scheme `url` starts with, if any.
pub fn remote_scheme(url: &str) -> Option<Scheme> {
    Scheme::ALL.into_iter().find(|scheme| scheme.matches(url))
}

pub fn is_remote(url: &str) -> bool {
    remote_scheme(url).is_some()
}

pub fn is_file_protocol(url: &str) -> bool {
    has_prefix_ignore_case(url, FILE_PREFIX)
}

/// `url` without a leading `file://`, or `url` unchanged.
pub fn strip_file_protocol(url: &str) -> &str {
    if is_file_protocol(url) {
        &url[FILE_PREFIX.len()..]
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_schemes_are_recognised() {
        for url in [
            "http://a/b",
            "https://a/b",
            "ftp://a/b",
            "ftps://a/b",
            "sftp://a/b",
            "s3://bucket/key",
        ] {
            assert!(is_remote(url), "{url} should be remote");
        }
    }

    #[test]
    fn classification_ignores_case() {
        assert!(is_remote("HTTPS://example.com"));
        assert!(is_remote("SFTP://ABC/12345678.hosts"));
        assert_eq!(remote_scheme("S3://b/k"), Some(Scheme::S3));
        assert!(is_file_protocol("FILE:///etc/hosts"));
    }

    #[test]
    fn local_paths_are_not_remote() {
        assert!(!is_remote("/etc/hosts"));
        assert!(!is_remote("hello.txt"));
        assert!(!is_remote("file://x"));
        assert!(!is_remote("http:/missing-slash"));
        assert!(!is_remote("httpx://a"));
        assert!(!is_remote(""));
        assert!(!is_remote("ünïcode://x"));
    }

    #[test]
    fn https_is_not_mistaken_for_http() {
        assert_eq!(remote_scheme("https://a"), Some(Scheme::Https));
        assert_eq!(remote_scheme("ftps://a"), Some(Scheme::Ftps));
        assert_eq!(remote_scheme("sftp://a"), Some(Scheme::Sftp));
    }

    #[test]
    fn strips_only_a_leading_file_prefix() {
        assert_eq!(strip_file_protocol("file:///hello/world"), "/hello/world");
        assert_eq!(strip_file_protocol("File://hello.txt"), "hello.txt");
        assert_eq!(strip_file_protocol("/a/file://b"), "/a/file://b");
        assert_eq!(strip_file_protocol("http://x"), "http://x");
    }
}
