//! Host operating system detection and OS-specific well-known paths.

use std::fmt;
use std::path::PathBuf;

use crate::{Error, Result};

lazy_static::lazy_static! {
    static ref CURRENT: Platform = Platform::from_os(std::env::consts::OS);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
    Other(String),
}

impl Platform {
    /// The platform this process runs on, detected once.
    pub fn current() -> &'static Platform {
        &CURRENT
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::Darwin,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Location of the hosts file.
    pub fn etc_hosts(&self) -> Result<PathBuf> {
        let path = match self {
            Platform::Windows => r"C:\Windows\System32\Drivers\etc\hosts",
            Platform::Linux => "/etc/hosts",
            Platform::Darwin => "/private/etc/hosts",
            Platform::Other(os) => {
                return Err(Error::ProtocolUnsupported {
                    what: format!("{os} is not yet supported"),
                })
            }
        };
        Ok(PathBuf::from(path))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Linux => f.write_str("linux"),
            Platform::Darwin => f.write_str("darwin"),
            Platform::Other(os) => f.write_str(os),
        }
    }
}

/// Hosts file of the current platform.
pub fn default_etc_hosts() -> Result<PathBuf> {
    Platform::current().etc_hosts()
}
