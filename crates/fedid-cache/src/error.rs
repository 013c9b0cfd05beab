//! Cache error types.

use thiserror::Error;

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors raised by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend rejected the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}
