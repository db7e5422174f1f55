//! Download execution.
//!
//! [`Fetcher`] is the seam between remote files and the network, so tests can
//! swap in [`mock::MockFetcher`] instead of talking to a server.

use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::debug;

use crate::types::{FetchRequest, Fetched};
use crate::{FetchConfig, FetchError};

/// Something that can turn a URL into a byte stream.
pub trait Fetcher: Send + Sync {
    /// Start a download. The returned body streams the payload; nothing is
    /// buffered up front.
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Fetched, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Fetched, FetchError> {
        (**self).fetch(request)
    }
}

/// HTTP and HTTPS downloads over reqwest's blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// A client built from `config`. A zero default timeout means requests
    /// without their own timeout may wait indefinitely.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.default_timeout());

        if let Some(connect_timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(connect_timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Fetched, FetchError> {
        let url = request.url;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        }

        debug!(
            scheme = url.scheme(),
            host = url.host_str().unwrap_or(""),
            timeout_ms = request.timeout.as_millis() as u64,
            "starting download"
        );

        let mut builder = self.client.get(url.clone());
        if !request.timeout.is_zero() {
            builder = builder.timeout(request.timeout);
        }

        if let Some(creds) = request.credentials {
            if let Some(token) = &creds.token {
                builder = builder.bearer_auth(token);
            } else if let Some(user) = &creds.user {
                builder = builder.basic_auth(user, creds.password.as_ref());
            }
        }

        let response = builder.send().map_err(FetchError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "download rejected");
            return Err(FetchError::from_status(status));
        }

        Ok(Fetched::new(url, Box::new(response)))
    }
}

/// Mock fetcher for testing.
///
/// Serves canned bodies keyed by the full URL string.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    use http::StatusCode;

    use crate::{Credentials, FetchErrorKind};

    /// A request as seen by [`MockFetcher`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub url: String,
        pub credentials: Option<Credentials>,
        pub timeout: Duration,
    }

    #[derive(Debug, Clone)]
    enum Canned {
        Body(Vec<u8>),
        Failure(FetchErrorKind),
    }

    #[derive(Debug, Clone, Default)]
    pub struct MockFetcher {
        responses: Arc<Mutex<HashMap<String, Canned>>>,
        recorded_requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for `url`.
        pub fn with_body(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.into(), Canned::Body(body.into()));
            self
        }

        /// Fail requests for `url` with an error of the given kind.
        pub fn with_failure(self, url: impl Into<String>, kind: FetchErrorKind) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.into(), Canned::Failure(kind));
            self
        }

        pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }
    }

    fn failure(kind: FetchErrorKind) -> FetchError {
        match kind {
            FetchErrorKind::Timeout => FetchError::Timeout {
                message: "mock timeout".to_string(),
            },
            FetchErrorKind::Auth => FetchError::Auth {
                status: StatusCode::UNAUTHORIZED,
            },
            FetchErrorKind::NotFound => FetchError::NotFound {
                status: StatusCode::NOT_FOUND,
            },
            FetchErrorKind::Network => FetchError::Other {
                message: "mock network failure".to_string(),
            },
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, request: &FetchRequest<'_>) -> Result<Fetched, FetchError> {
            self.recorded_requests.lock().unwrap().push(RecordedRequest {
                url: request.url.to_string(),
                credentials: request.credentials.cloned(),
                timeout: request.timeout,
            });

            let canned = self
                .responses
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned();

            match canned {
                Some(Canned::Body(body)) => {
                    Ok(Fetched::new(request.url, Box::new(Cursor::new(body))))
                }
                Some(Canned::Failure(kind)) => Err(failure(kind)),
                None => Err(FetchError::NotFound {
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }
}
