use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Unavailable(String),

    #[error("Storage request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed connecting to session store after {attempts} attempts: {reason}")]
    ConnectFailed { attempts: u32, reason: String },
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
