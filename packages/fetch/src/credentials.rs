use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication material handed to a fetcher.
///
/// Fetchers only read it. Which fields matter depends on the scheme: HTTP
/// uses `token` (bearer) or `user`/`password` (basic); key-based schemes such
/// as sftp use `private_key` and `passphrase`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

impl Credentials {
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Default::default()
        }
    }

    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn with_private_key(
        mut self,
        private_key: impl Into<String>,
        passphrase: Option<String>,
    ) -> Self {
        self.private_key = Some(private_key.into());
        self.passphrase = passphrase;
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

// Secrets never reach logs through Debug.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("token", &redact(&self.token))
            .field("private_key", &redact(&self.private_key))
            .field("passphrase", &redact(&self.passphrase))
            .finish()
    }
}
