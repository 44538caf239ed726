//! Well-known cache keys.
//!
//! Both tiers hold exactly one entry each: the whole configuration document.

/// Default key of the configuration entry in the fast tier.
pub const DEFAULT_FAST_KEY: &str = "shortcode-config";
/// Default key of the configuration entry in the durable tier.
pub const DEFAULT_DURABLE_KEY: &str = "shortcodes-config";

/// Key names shared by every resolution against the same tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub fast: String,
    pub durable: String,
}

impl CacheKeys {
    pub fn new(fast: impl Into<String>, durable: impl Into<String>) -> Self {
        Self {
            fast: fast.into(),
            durable: durable.into(),
        }
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_FAST_KEY, DEFAULT_DURABLE_KEY)
    }
}
