//! In-memory fast tier.

use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;
use serde_json::Value;

use super::config::CacheConfig;
use super::error::CacheError;
use super::lock::{rw_read, rw_write};
use super::tier::FastCache;

const SOURCE: &str = "cache::store";
const METRIC_MEMORY_EVICT: &str = "shortcodes_cache_memory_evict_total";

/// Process-local fast tier.
///
/// Uses LRU eviction with a configurable limit. Entries never expire on their
/// own; they live until evicted, deleted, or the process exits.
pub struct MemoryCache {
    entries: RwLock<LruCache<String, Value>>,
}

impl MemoryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Create a memory cache sized by the given configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.memory_capacity_non_zero())
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl FastCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(rw_write(&self.entries, SOURCE, "get").get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        let displaced = rw_write(&self.entries, SOURCE, "set").push(key.to_string(), value);
        if let Some((displaced_key, _)) = displaced
            && displaced_key != key
        {
            counter!(METRIC_MEMORY_EVICT).increment(1);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
        Ok(())
    }
}
