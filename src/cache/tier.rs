use std::time::Duration;

use serde_json::Value;

use super::error::CacheError;

/// Lifetime of a durable cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The entry never expires.
    Never,
    /// The entry expires after the given duration.
    After(Duration),
}

impl Ttl {
    /// Interpret a seconds count where `0` is the "never expire" sentinel.
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::Never
        } else {
            Self::After(Duration::from_secs(secs))
        }
    }

    /// Inverse of [`Ttl::from_secs`].
    pub fn as_secs(self) -> u64 {
        match self {
            Self::Never => 0,
            Self::After(duration) => duration.as_secs(),
        }
    }
}

/// Low-latency shared cache. Expiry is managed by the backend, not the caller.
///
/// Values are stored raw: a tier may hold anything, including values that do
/// not pass configuration validation.
pub trait FastCache: Send + Sync {
    /// Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError>;

    /// Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Slower, longer-lived cache with explicit TTLs.
pub trait DurableCache: Send + Sync {
    /// Returns `Ok(None)` when the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    fn set(&self, key: &str, value: Value, ttl: Ttl) -> Result<(), CacheError>;

    /// Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seconds_means_never() {
        assert_eq!(Ttl::from_secs(0), Ttl::Never);
        assert_eq!(Ttl::Never.as_secs(), 0);
    }

    #[test]
    fn positive_seconds_round_trip() {
        let ttl = Ttl::from_secs(90);
        assert_eq!(ttl, Ttl::After(Duration::from_secs(90)));
        assert_eq!(ttl.as_secs(), 90);
    }
}
