//! In-memory key/value store.
//!
//! `MemStore` implements `KeyValueStore` over a `BTreeMap` behind a shared
//! handle, so a test can keep a clone and inspect what the guest persisted.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HostError;
use crate::kv_store::KeyValueStore;

#[derive(Debug, Clone, Default)]
pub struct MemStore {
    data: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with data.
    pub fn with_data(data: BTreeMap<String, String>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }
}

impl KeyValueStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), HostError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), HostError> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HostError> {
        self.lock().clear();
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, HostError> {
        Ok(self.lock().contains_key(key))
    }
}
