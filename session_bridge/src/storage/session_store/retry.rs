use std::future::Future;
use std::time::Duration;

use crate::storage::errors::StorageError;

use super::config::SessionStoreConfig;
use super::types::{RedisSessionStore, SessionStore};

/// Connect to the session store, waiting for it to come up.
///
/// Retries every `retry_wait` until `max_attempts` have failed, then gives up
/// with [`StorageError::ConnectFailed`].
pub async fn connect_with_retry(
    config: &SessionStoreConfig,
) -> Result<RedisSessionStore, StorageError> {
    tracing::info!("Connecting to session store at {}", config.url());

    let store = retry_connect(config.max_attempts, config.retry_wait, move || async move {
        let store = RedisSessionStore::connect(config).await?;
        store.init().await?;
        Ok(store)
    })
    .await?;

    tracing::info!("Connected to session store");
    Ok(store)
}

pub(crate) async fn retry_connect<F, Fut, T>(
    max_attempts: u32,
    wait: Duration,
    mut connect: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 1;
    loop {
        match connect().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                tracing::error!("Giving up on session store after {} attempts: {}", attempt, e);
                return Err(StorageError::ConnectFailed {
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    "Session store connection attempt {}/{} failed: {}",
                    attempt,
                    max_attempts,
                    e
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
