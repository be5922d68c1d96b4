//! Central configuration for the session-bridge crate
//!
//! Everything is read once at startup into a [`BridgeConfig`]. Components get
//! the pieces they need passed in explicitly; nothing below this module reads
//! the process environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::session::SessionSettings;
use crate::storage::SessionStoreConfig;
use crate::utils::base64_decode;

/// Prefix the issuing framework puts in front of the base64 encoded key.
pub(crate) const APP_KEY_PREFIX: &str = "base64:";
/// AES-256 key length.
const APP_KEY_LEN: usize = 32;

/// Environment lookup used while building configuration.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    #[error("Invalid APP_KEY: {0}")]
    InvalidAppKey(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// The shared application secret, decoded from `APP_KEY`.
#[derive(Clone)]
pub struct AppKey(Vec<u8>);

impl AppKey {
    /// Parse `base64:<key>` as written in the web application's environment.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let encoded = raw.trim().strip_prefix(APP_KEY_PREFIX).ok_or_else(|| {
            ConfigError::InvalidAppKey(format!("missing '{APP_KEY_PREFIX}' prefix"))
        })?;

        let bytes =
            base64_decode(encoded).map_err(|e| ConfigError::InvalidAppKey(e.to_string()))?;

        if bytes.len() != APP_KEY_LEN {
            return Err(ConfigError::InvalidAppKey(format!(
                "expected {APP_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; APP_KEY_LEN]) -> Self {
        Self(bytes.to_vec())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppKey([redacted])")
    }
}

/// Everything the bridge needs to authenticate requests.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub app_key: AppKey,
    pub session: SessionSettings,
    pub store: SessionStoreConfig,
    /// `APP_DEBUG=true`; only affects default log verbosity.
    pub debug: bool,
}

impl BridgeConfig {
    /// Load `.env.<APP_ENV>` and `.env`, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup: Lookup = &lookup;

        let app_key = lookup("APP_KEY").ok_or(ConfigError::MissingVar("APP_KEY"))?;

        Ok(Self {
            app_key: AppKey::parse(&app_key)?,
            session: SessionSettings::from_lookup(lookup),
            store: SessionStoreConfig::from_lookup(lookup)?,
            debug: lookup("APP_DEBUG").as_deref() == Some("true"),
        })
    }
}

/// Values already present in the process environment take precedence over
/// both files, and `.env.<APP_ENV>` takes precedence over `.env`.
fn load_dotenv() {
    let base_dir = env::var("SESSION_BRIDGE_BASEDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    for file in [base_dir.join(format!(".env.{app_env}")), base_dir.join(".env")] {
        match dotenvy::from_path(&file) {
            Ok(()) => tracing::debug!("Loaded environment from {}", file.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Failed to load {}: {}", file.display(), e),
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset or empty.
pub(crate) fn parse_var<T: FromStr>(
    lookup: Lookup,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(default),
    }
}
