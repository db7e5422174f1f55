//! Fail-fast access to the `Result` API for callers that cannot recover,
//! such as process startup.

use tracing::error;

use crate::Error;

pub trait OrFatal<T> {
    /// Unwrap the value, or log the error and panic with its message.
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T, Error> {
    #[track_caller]
    fn or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                error!(error = %err, "fatal");
                panic!("{err}")
            }
        }
    }
}
