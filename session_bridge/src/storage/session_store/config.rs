use std::time::Duration;

use crate::config::{ConfigError, Lookup, parse_var};

const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;
const DEFAULT_RETRY_WAIT_MS: u64 = 1000;
const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Where the session cache lives and how patiently to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStoreConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single read, so a stalled store cannot hold up requests.
    pub read_timeout: Duration,
    /// Wait between initial connection attempts.
    pub retry_wait: Duration,
    /// Initial connection attempts before giving up for good.
    pub max_attempts: u32,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            retry_wait: Duration::from_millis(DEFAULT_RETRY_WAIT_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SessionStoreConfig {
    pub(crate) fn from_lookup(lookup: Lookup) -> Result<Self, ConfigError> {
        let max_attempts = parse_var(lookup, "SESSION_STORE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_STORE_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: lookup("REDIS_HOST")
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
            port: parse_var(lookup, "REDIS_PORT", DEFAULT_REDIS_PORT)?,
            read_timeout: Duration::from_millis(parse_var(
                lookup,
                "SESSION_STORE_TIMEOUT_MS",
                DEFAULT_READ_TIMEOUT_MS,
            )?),
            retry_wait: Duration::from_millis(parse_var(
                lookup,
                "SESSION_STORE_RETRY_WAIT_MS",
                DEFAULT_RETRY_WAIT_MS,
            )?),
            max_attempts,
        })
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}
