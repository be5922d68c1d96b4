//! session-bridge - Session cookie authentication for real-time services
//!
//! Lets a service that sits next to a web application (websocket or
//! notification servers, typically) accept connections from that
//! application's logged-in users. The browser's encrypted session cookie is
//! verified and decrypted with the shared application key, the session is
//! read from the shared cache store, and the CSRF token on the request URL is
//! checked against it.

mod config;
mod serialized;
mod session;
mod storage;
mod utils;

use std::sync::Arc;

use thiserror::Error;

pub use config::{AppKey, BridgeConfig, ConfigError};

pub use session::{
    AuthenticatedIdentity, Session, SessionAuthenticator, SessionError,
    SessionLookupKey, SessionSettings, UNIVERSAL_SCOPE,
};

pub use storage::{
    InMemorySessionStore, RedisSessionStore, SessionStore, SessionStoreConfig, StorageError,
    connect_with_retry,
};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session store error: {0}")]
    Storage(#[from] StorageError),
}

/// Initialize the bridge from the environment
///
/// Reads the configuration, then connects to the session store, waiting for
/// it as long as the retry policy allows.
pub async fn init() -> Result<SessionAuthenticator, InitError> {
    let config = BridgeConfig::from_env()?;
    init_with_config(&config).await
}

/// Initialize the bridge from an already loaded configuration
pub async fn init_with_config(config: &BridgeConfig) -> Result<SessionAuthenticator, InitError> {
    let store = connect_with_retry(&config.store).await?;

    Ok(SessionAuthenticator::new(
        &config.app_key,
        config.session.clone(),
        Arc::new(store),
    ))
}
