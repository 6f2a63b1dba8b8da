//! Error types for binder-core.

use thiserror::Error;

/// Result type alias using CacheError.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors reported by a cache collaborator.
///
/// The parser treats every variant as a cache miss and falls back to a live parse.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("corrupt cache entry for {hash}: {reason}")]
    Corrupt { hash: String, reason: String },
}
