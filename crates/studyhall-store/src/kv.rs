//! Key-value store trait and the in-memory implementation

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{StoreError, StoreResult};

/// Local key-value storage, modelled on a browser local-storage contract:
/// string keys, opaque string values, synchronous access.
pub trait LocalStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value (may fail, e.g. quota exceeded)
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a key; absent keys are not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,

    /// When set, writes fail (simulates quota exhaustion)
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure injected".into()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_write_failure_injection() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();

        store.set_fail_writes(true);
        assert!(store.set("k", "v2").is_err());

        // Reads still work and see the last good value
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
