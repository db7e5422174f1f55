use http::StatusCode;

/// Coarse classification of a fetch failure.
///
/// Callers decide retry policy from this; fetchers never retry on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Auth,
    NotFound,
    Network,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("authentication rejected: {status}")]
    Auth { status: StatusCode },

    #[error("resource not found: {status}")]
    NotFound { status: StatusCode },

    #[error("unexpected response: {status}")]
    Status { status: StatusCode },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no fetcher registered for scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Failure reported by a caller-supplied fetcher (ftp, sftp, s3, ...).
    #[error("{message}")]
    Other { message: String },
}

impl FetchError {
    /// Map a non-success HTTP status onto the taxonomy.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth { status },
            StatusCode::NOT_FOUND | StatusCode::GONE => FetchError::NotFound { status },
            _ => FetchError::Status { status },
        }
    }

    /// Map a transport error, pulling timeouts out of the generic bucket.
    ///
    /// The URL is stripped so credentials embedded in it never reach a
    /// message.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let error = error.without_url();
        if error.is_timeout() {
            FetchError::Timeout {
                message: error.to_string(),
            }
        } else {
            FetchError::Http(error)
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Auth { .. } => FetchErrorKind::Auth,
            FetchError::NotFound { .. } => FetchErrorKind::NotFound,
            FetchError::Http(e) if e.is_timeout() => FetchErrorKind::Timeout,
            FetchError::Http(e) => match e.status() {
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => FetchErrorKind::Auth,
                Some(StatusCode::NOT_FOUND) => FetchErrorKind::NotFound,
                _ => FetchErrorKind::Network,
            },
            FetchError::Status { .. }
            | FetchError::UnsupportedScheme { .. }
            | FetchError::InvalidConfig { .. }
            | FetchError::Other { .. } => FetchErrorKind::Network,
        }
    }
}
