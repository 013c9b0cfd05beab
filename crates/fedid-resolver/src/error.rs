//! Resolver error types.

use fedid_cache::CacheError;
use fedid_spi::SpiError;
use thiserror::Error;

/// Result type alias for resolver operations.
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

/// Errors raised by resolver construction and resolution passes.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver configuration is invalid (duplicate ids, dangling
    /// dependencies, cycles). Raised at construction, never at runtime.
    #[error("resolver configuration error: {0}")]
    Configuration(String),

    /// A requested attribute id has no definition.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A plugin failed and its error propagated.
    #[error(transparent)]
    Plugin(#[from] SpiError),

    /// The result cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
