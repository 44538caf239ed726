//! Cache-layer view of the `[cache]` settings.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use super::keys::{CacheKeys, DEFAULT_DURABLE_KEY, DEFAULT_FAST_KEY};

pub const DEFAULT_MEMORY_CAPACITY: usize = 64;
pub const DEFAULT_DURABLE_DIR: &str = ".cache/shortcodes";

/// Parameters the tiers are built from; see `config::CacheSettings`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Key of the configuration entry in the fast tier.
    pub fast_key: String,
    /// Key of the configuration entry in the durable tier.
    pub durable_key: String,
    /// Maximum entries held by the in-memory fast tier.
    pub memory_capacity: usize,
    /// Consult the durable tier while resolving.
    pub enable_durable: bool,
    /// Directory backing the durable tier.
    pub durable_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fast_key: DEFAULT_FAST_KEY.to_string(),
            durable_key: DEFAULT_DURABLE_KEY.to_string(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            enable_durable: false,
            durable_dir: PathBuf::from(DEFAULT_DURABLE_DIR),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            fast_key: settings.fast_key.clone(),
            durable_key: settings.durable_key.clone(),
            memory_capacity: settings.memory_capacity,
            enable_durable: settings.enable_durable,
            durable_dir: settings.durable_dir.clone(),
        }
    }
}

impl CacheConfig {
    pub fn keys(&self) -> CacheKeys {
        CacheKeys::new(self.fast_key.clone(), self.durable_key.clone())
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
