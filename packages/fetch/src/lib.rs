//! # ufs-fetch
//!
//! Remote download transport for ufs.
//!
//! A [`Fetcher`] turns a URL plus optional [`Credentials`] and a timeout into
//! a streaming [`Fetched`] body. Failures carry a [`FetchErrorKind`] so callers
//! can tell timeouts, rejected credentials and missing resources apart.
//!
//! ## Fetchers
//!
//! - [`ReqwestFetcher`]: HTTP and HTTPS over reqwest's blocking client
//! - [`SchemeRouter`]: picks a fetcher by URL scheme; ftp, sftp and s3
//!   transports are registered by the caller
//! - `mock::MockFetcher`: canned responses, behind the `test-utils` feature
//!
//! ## Configuration
//!
//! [`FetchConfig`] holds the default timeout (30 seconds), connect timeout and
//! user agent, and can be read from `UFS_*` environment variables.

mod config;
mod credentials;
mod error;
mod executor;
mod router;
mod types;

pub use config::{FetchConfig, CONNECT_TIMEOUT_ENV, TIMEOUT_ENV, USER_AGENT_ENV};
pub use credentials::Credentials;
pub use error::{FetchError, FetchErrorKind};
#[cfg(any(test, feature = "test-utils"))]
pub use executor::mock;
pub use executor::{Fetcher, ReqwestFetcher};
pub use router::SchemeRouter;
pub use types::{split_url_path, FetchRequest, Fetched};
