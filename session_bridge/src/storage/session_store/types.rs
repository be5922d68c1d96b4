use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;

use crate::storage::errors::StorageError;

/// Read access to the cache the web application keeps its sessions in.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Check that the store is reachable.
    async fn init(&self) -> Result<(), StorageError>;

    /// Raw record stored under `key`, or `None` when there is no such record.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

/// Redis backed store sharing one multiplexed connection between requests.
///
/// The connection is replaced from `client` when it breaks.
pub struct RedisSessionStore {
    pub(super) client: redis::Client,
    pub(super) connection: RwLock<SharedConnection>,
    pub(super) read_timeout: Duration,
}

/// The current connection and how many times it has been replaced.
#[derive(Clone)]
pub(super) struct SharedConnection {
    pub(super) generation: u64,
    pub(super) connection: MultiplexedConnection,
}

/// Process-local store for tests and local development.
#[derive(Default)]
pub struct InMemorySessionStore {
    pub(super) entries: RwLock<HashMap<String, Vec<u8>>>,
}
