//! Shortcode configuration cache tiers.
//!
//! Two tiers sit in front of the configuration file:
//!
//! - **Fast tier**: process-local, LRU-bounded, no expiry ([`MemoryCache`])
//! - **Durable tier**: file-backed, survives restarts, supports TTLs ([`FileCache`])
//!
//! ## Configuration
//!
//! Cache behavior comes from the `[cache]` table of the settings files (for
//! example `shortcodes.toml`), loaded by [`crate::config`]:
//!
//! ```toml
//! [cache]
//! fast_key = "shortcode-config"
//! durable_key = "shortcodes-config"
//! memory_capacity = 64
//! enable_durable = false
//! durable_dir = ".cache/shortcodes"
//! ```

mod config;
mod error;
mod file;
mod keys;
mod lock;
mod store;
mod tier;

pub use config::{CacheConfig, DEFAULT_DURABLE_DIR, DEFAULT_MEMORY_CAPACITY};
pub use error::CacheError;
pub use file::FileCache;
pub use keys::{CacheKeys, DEFAULT_DURABLE_KEY, DEFAULT_FAST_KEY};
pub use store::MemoryCache;
pub use tier::{DurableCache, FastCache, Ttl};
