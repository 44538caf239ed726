//! Recording cache tiers shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::Value;
use shortcodes::cache::{CacheError, DurableCache, FastCache, Ttl};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Get(String),
    Set(String, Value),
    SetTtl(String, Value, Ttl),
    Delete(String),
}

/// Fast tier that records every call and can be told to fail reads.
#[derive(Debug, Default)]
pub struct RecordingFast {
    entries: Mutex<HashMap<String, Value>>,
    ops: Mutex<Vec<Op>>,
    fail_reads: bool,
}

impl RecordingFast {
    pub fn with(key: &str, value: Value) -> Self {
        let tier = Self::default();
        tier.entries.lock().unwrap().insert(key.to_string(), value);
        tier
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, Op::Get(_)))
            .collect()
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl FastCache for RecordingFast {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.ops.lock().unwrap().push(Op::Get(key.to_string()));
        if self.fail_reads {
            return Err(CacheError::unavailable("fast tier offline"));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::Set(key.to_string(), value.clone()));
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.ops.lock().unwrap().push(Op::Delete(key.to_string()));
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Durable tier that records every call, including the TTL it was given.
#[derive(Debug, Default)]
pub struct RecordingDurable {
    entries: Mutex<HashMap<String, Value>>,
    ops: Mutex<Vec<Op>>,
}

impl RecordingDurable {
    pub fn with(key: &str, value: Value) -> Self {
        let tier = Self::default();
        tier.entries.lock().unwrap().insert(key.to_string(), value);
        tier
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, Op::Get(_)))
            .collect()
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl DurableCache for RecordingDurable {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.ops.lock().unwrap().push(Op::Get(key.to_string()));
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value, ttl: Ttl) -> Result<(), CacheError> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::SetTtl(key.to_string(), value.clone(), ttl));
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.ops.lock().unwrap().push(Op::Delete(key.to_string()));
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Write `contents` to the default configuration location under `base`.
pub fn write_default_config(base: &Path, contents: &str) -> PathBuf {
    let path = base.join(".config").join("shortcodes.yaml");
    std::fs::create_dir_all(path.parent().expect("config dir")).expect("create config dir");
    std::fs::write(&path, contents).expect("write config");
    path
}
