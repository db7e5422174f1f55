//! Fetcher configuration.
//!
//! Defaults can be overridden from the environment:
//!
//! - `UFS_FETCH_TIMEOUT_SECS`: default request timeout
//! - `UFS_CONNECT_TIMEOUT_SECS`: connect timeout
//! - `UFS_USER_AGENT`: `User-Agent` header value

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::FetchError;

pub const TIMEOUT_ENV: &str = "UFS_FETCH_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV: &str = "UFS_CONNECT_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "UFS_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Applied when a request carries a zero timeout. Zero disables the
    /// client-wide timeout.
    pub default_timeout_secs: u64,
    /// `None` or zero leaves the connect phase bounded only by the overall
    /// timeout.
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: None,
            user_agent: concat!("ufs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Defaults overlaid with the `UFS_*` environment variables.
    pub fn from_env() -> Result<Self, FetchError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FetchError> {
        let mut config = Self::default();

        if let Some(value) = lookup(TIMEOUT_ENV) {
            config.default_timeout_secs = parse_secs(TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(CONNECT_TIMEOUT_ENV) {
            config.connect_timeout_secs = Some(parse_secs(CONNECT_TIMEOUT_ENV, &value)?);
        }
        if let Some(value) = lookup(USER_AGENT_ENV) {
            if !value.trim().is_empty() {
                config.user_agent = value;
            }
        }

        Ok(config)
    }

    /// `None` when the client should not time requests out on its own.
    pub fn default_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.default_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.and_then(non_zero_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_secs(name: &str, value: &str) -> Result<u64, FetchError> {
    value
        .trim()
        .parse()
        .map_err(|e| FetchError::InvalidConfig {
            message: format!("{name}={value:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.default_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout(), None);
        assert!(config.user_agent.starts_with("ufs/"));
    }

    #[test]
    fn environment_overrides() {
        let config = FetchConfig::from_lookup(lookup(&[
            (TIMEOUT_ENV, "5"),
            (CONNECT_TIMEOUT_ENV, " 2 "),
            (USER_AGENT_ENV, "custom/1.0"),
        ]))
        .unwrap();

        assert_eq!(config.default_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.user_agent, "custom/1.0");
    }

    #[test]
    fn zero_disables_timeouts() {
        let config = FetchConfig::from_lookup(lookup(&[
            (TIMEOUT_ENV, "0"),
            (CONNECT_TIMEOUT_ENV, "0"),
        ]))
        .unwrap();

        assert_eq!(config.default_timeout_secs, 0);
        assert_eq!(config.default_timeout(), None);
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn blank_user_agent_is_ignored() {
        let config = FetchConfig::from_lookup(lookup(&[(USER_AGENT_ENV, "  ")])).unwrap();
        assert_eq!(config.user_agent, FetchConfig::default().user_agent);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = FetchConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig { .. }));
        assert!(err.to_string().contains(TIMEOUT_ENV));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: FetchConfig = serde_json::from_str(r#"{"default_timeout_secs": 7}"#).unwrap();
        assert_eq!(config.default_timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.user_agent, FetchConfig::default().user_agent);
    }
}
