use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{self, AsyncCommands, RedisError, RedisResult};
use tokio::sync::RwLock;

use crate::storage::errors::StorageError;

use super::config::SessionStoreConfig;
use super::types::{RedisSessionStore, SessionStore, SharedConnection};

impl RedisSessionStore {
    /// Open a multiplexed connection. Makes a single attempt; see
    /// [`connect_with_retry`](super::connect_with_retry) for the startup policy.
    pub async fn connect(config: &SessionStoreConfig) -> Result<Self, StorageError> {
        let client = redis::Client::open(config.url())?;
        let connection = open_connection(&client, config.read_timeout).await?;

        Ok(Self {
            client,
            connection: RwLock::new(SharedConnection {
                generation: 0,
                connection,
            }),
            read_timeout: config.read_timeout,
        })
    }

    async fn with_timeout<T, F>(&self, request: F) -> Result<RedisResult<T>, StorageError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        tokio::time::timeout(self.read_timeout, request)
            .await
            .map_err(|_| StorageError::Timeout(self.read_timeout))
    }

    /// Run `request` on the shared connection. A request that fails because
    /// the connection broke is sent once more on a fresh connection.
    async fn query<T, F, Fut>(&self, request: F) -> Result<T, StorageError>
    where
        F: Fn(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        // Clones share the underlying connection; requests are pipelined.
        let shared = self.connection.read().await.clone();

        match self.with_timeout(request(shared.connection)).await? {
            Ok(value) => Ok(value),
            Err(e) if is_connection_error(&e) => {
                tracing::warn!("Session store connection lost: {}", e);
                let shared = self.reconnect(shared.generation).await?;
                Ok(self.with_timeout(request(shared.connection)).await??)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the connection of `failed_generation`, unless a concurrent
    /// request already did.
    async fn reconnect(&self, failed_generation: u64) -> Result<SharedConnection, StorageError> {
        let mut shared = self.connection.write().await;

        if shared.generation == failed_generation {
            shared.connection = open_connection(&self.client, self.read_timeout)
                .await
                .inspect_err(|e| tracing::error!("Failed reconnecting to session store: {}", e))?;
            shared.generation += 1;
            tracing::info!("Reconnected to session store");
        }

        Ok(shared.clone())
    }
}

async fn open_connection(
    client: &redis::Client,
    timeout: Duration,
) -> Result<MultiplexedConnection, StorageError> {
    let connection = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
        .await
        .map_err(|_| StorageError::Timeout(timeout))??;
    Ok(connection)
}

fn is_connection_error(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped() || e.is_unrecoverable_error()
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.query(|mut conn| async move {
            let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, RedisError>(pong)
        })
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.query(move |mut conn| async move {
            let value: Option<Vec<u8>> = conn.get(key).await?;
            Ok::<_, RedisError>(value)
        })
        .await
    }
}
