//! Cache-related errors.

use std::io;

use thiserror::Error;

/// Errors raised by a cache tier backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache i/o failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("cache entry `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    pub fn io(key: &str, source: io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }

    pub fn corrupt(key: &str, source: serde_json::Error) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            source,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
