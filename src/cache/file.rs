//! File-backed durable tier.
//!
//! Each key maps to one JSON envelope named after the SHA-256 digest of the
//! key. Writes go through a temporary file in the same directory and are
//! persisted with a rename, so readers never observe a half-written entry.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::error::CacheError;
use super::tier::{DurableCache, Ttl};

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: String,
    #[serde(with = "time::serde::rfc3339::option")]
    expires_at: Option<OffsetDateTime>,
    value: Value,
}

impl Envelope {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Durable tier storing entries as files under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash_key(key)))
    }

    fn read_at(&self, key: &str, now: OffsetDateTime) -> Result<Option<Value>, CacheError> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CacheError::io(key, err)),
        };

        let envelope: Envelope =
            serde_json::from_str(&raw).map_err(|err| CacheError::corrupt(key, err))?;

        if envelope.is_expired(now) {
            debug!(
                target = "cache::file",
                op = "file_cache::get",
                result = "expired",
                key,
                "Durable cache entry expired"
            );
            self.remove(key, &path)?;
            return Ok(None);
        }

        if envelope.key != key {
            warn!(
                target = "cache::file",
                op = "file_cache::get",
                result = "key_mismatch",
                key,
                stored_key = %envelope.key,
                "Durable cache entry belongs to a different key; ignoring"
            );
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    fn write_at(
        &self,
        key: &str,
        value: Value,
        ttl: Ttl,
        now: OffsetDateTime,
    ) -> Result<(), CacheError> {
        let expires_at = match ttl {
            Ttl::Never => None,
            Ttl::After(duration) => Some(now + duration),
        };
        let envelope = Envelope {
            key: key.to_string(),
            expires_at,
            value,
        };
        let body = serde_json::to_vec(&envelope).map_err(|err| CacheError::corrupt(key, err))?;

        fs::create_dir_all(&self.dir).map_err(|err| CacheError::io(key, err))?;
        let mut staged = tempfile::Builder::new()
            .prefix(".entry-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|err| CacheError::io(key, err))?;
        staged
            .write_all(&body)
            .map_err(|err| CacheError::io(key, err))?;
        staged.flush().map_err(|err| CacheError::io(key, err))?;
        staged
            .persist(self.entry_path(key))
            .map_err(|err| CacheError::io(key, err.error))?;
        Ok(())
    }

    fn remove(&self, key: &str, path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::io(key, err)),
        }
    }
}

impl DurableCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.read_at(key, OffsetDateTime::now_utc())
    }

    fn set(&self, key: &str, value: Value, ttl: Ttl) -> Result<(), CacheError> {
        self.write_at(key, value, ttl, OffsetDateTime::now_utc())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.remove(key, &self.entry_path(key))
    }
}

fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
