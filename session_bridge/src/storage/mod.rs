mod errors;
mod session_store;

pub use errors::StorageError;
pub use session_store::{
    InMemorySessionStore, RedisSessionStore, SessionStore, SessionStoreConfig, connect_with_retry,
};
