//! Result cache trait and key types.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use fedid_model::{AttributeSet, ResolverAttribute};

use crate::error::CacheResult;

/// Key identifying one plugin's result for one principal/requester pair.
///
/// The requester participates because some plugin outputs (persistent
/// identifiers) are requester-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Plugin id.
    pub plugin_id: String,
    /// Principal name.
    pub principal: String,
    /// Requesting relying party, if authenticated.
    pub requester: Option<String>,
}

impl CacheKey {
    /// Creates a key.
    #[must_use]
    pub fn new(
        plugin_id: impl Into<String>,
        principal: impl Into<String>,
        requester: Option<&str>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            principal: principal.into(),
            requester: requester.map(str::to_string),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.plugin_id,
            self.principal,
            self.requester.as_deref().unwrap_or("-")
        )
    }
}

/// A cached plugin result.
#[derive(Debug, Clone)]
pub enum CachedResult {
    /// A data connector's raw attribute set.
    Connector(AttributeSet),
    /// A resolved attribute definition result.
    Attribute(ResolverAttribute),
}

/// Cache for per-plugin resolution results.
///
/// Implementations must be thread-safe; the resolver shares one cache
/// across all request tasks.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Gets a live (unexpired) result.
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResult>>;

    /// Stores a result for `ttl`. Implementations must ignore a zero TTL.
    async fn put(&self, key: CacheKey, value: CachedResult, ttl: Duration) -> CacheResult<()>;

    /// Drops every cached entry.
    async fn clear(&self) -> CacheResult<()>;
}
