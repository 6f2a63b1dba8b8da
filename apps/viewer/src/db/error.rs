//! Database error types.

use binder_core::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<DbError> for CacheError {
    fn from(e: DbError) -> Self {
        CacheError::Storage(e.to_string())
    }
}
