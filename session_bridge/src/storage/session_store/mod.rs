mod config;
mod memory;
mod redis;
mod retry;
mod types;

pub use config::SessionStoreConfig;
pub use retry::connect_with_retry;
pub use types::{InMemorySessionStore, RedisSessionStore, SessionStore};
