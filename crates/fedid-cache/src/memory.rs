//! In-memory TTL cache.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::CacheResult;
use crate::provider::{CacheKey, CachedResult, ResultCache};

#[derive(Debug, Clone)]
struct Entry {
    value: CachedResult,
    expires_at: Instant,
}

/// Process-local result cache with absolute expiry instants.
///
/// Reads drop expired entries lazily; inserts past `max_entries` trigger a
/// sweep of everything already expired before the new entry goes in.
#[derive(Debug, Default)]
pub struct InMemoryResultCache {
    entries: DashMap<CacheKey, Entry>,
    max_entries: usize,
}

impl InMemoryResultCache {
    /// Creates a cache bounded at `max_entries` live entries.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<CachedResult> {
        // The shard guard from get() must be released before remove()
        // touches the same key.
        let live = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));
        match live {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put_at(&self, key: CacheKey, value: CachedResult, ttl: Duration, now: Instant) {
        if ttl.is_zero() {
            return;
        }
        if self.max_entries > 0 && self.entries.len() >= self.max_entries {
            self.entries.retain(|_, entry| entry.expires_at > now);
        }
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResult>> {
        Ok(self.get_at(key, Instant::now()))
    }

    async fn put(&self, key: CacheKey, value: CachedResult, ttl: Duration) -> CacheResult<()> {
        self.put_at(key, value, ttl, Instant::now());
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedid_model::AttributeSet;

    fn key(plugin: &str) -> CacheKey {
        CacheKey::new(plugin, "jdoe", Some("https://sp.example.org"))
    }

    fn result() -> CachedResult {
        let mut set = AttributeSet::new();
        set.add("mail", "jdoe@example.edu".into());
        CachedResult::Connector(set)
    }

    #[test]
    fn zero_ttl_is_never_stored() {
        let cache = InMemoryResultCache::new(16);
        cache.put_at(key("dir"), result(), Duration::ZERO, Instant::now());
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entry_is_not_served() {
        let cache = InMemoryResultCache::new(16);
        let now = Instant::now();
        cache.put_at(key("dir"), result(), Duration::from_secs(30), now);

        assert!(cache.get_at(&key("dir"), now + Duration::from_secs(29)).is_some());
        assert!(cache.get_at(&key("dir"), now + Duration::from_secs(31)).is_none());
        // The expired entry was dropped on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_separate_principal_and_requester() {
        let cache = InMemoryResultCache::new(16);
        let now = Instant::now();
        cache.put_at(key("dir"), result(), Duration::from_secs(30), now);

        let other_principal = CacheKey::new("dir", "asmith", Some("https://sp.example.org"));
        assert!(cache.get_at(&other_principal, now).is_none());

        let other_requester = CacheKey::new("dir", "jdoe", Some("https://other.example.org"));
        assert!(cache.get_at(&other_requester, now).is_none());
    }

    #[test]
    fn full_cache_sweeps_expired_entries_on_insert() {
        let cache = InMemoryResultCache::new(2);
        let now = Instant::now();
        cache.put_at(key("a"), result(), Duration::from_secs(1), now);
        cache.put_at(key("b"), result(), Duration::from_secs(60), now);

        // "a" has expired by the time "c" is inserted.
        cache.put_at(key("c"), result(), Duration::from_secs(60), now + Duration::from_secs(2));

        assert!(cache.get_at(&key("a"), now + Duration::from_secs(2)).is_none());
        assert!(cache.get_at(&key("b"), now + Duration::from_secs(2)).is_some());
        assert!(cache.get_at(&key("c"), now + Duration::from_secs(2)).is_some());
    }

    #[tokio::test]
    async fn trait_round_trip() {
        let cache = InMemoryResultCache::new(16);
        cache
            .put(key("dir"), result(), Duration::from_secs(60))
            .await
            .unwrap();

        let hit = cache.get(&key("dir")).await.unwrap();
        assert!(matches!(hit, Some(CachedResult::Connector(_))));

        cache.clear().await.unwrap();
        assert!(cache.get(&key("dir")).await.unwrap().is_none());
    }
}
