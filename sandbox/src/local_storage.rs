//! Guest local storage over a text-only key/value store.
//!
//! The guest stores arrays of words; they are kept as printable ASCII.
//! Store failures are logged and read back as empty.

use canopy_hostapi::KeyValueStore;
use canopy_primitives::ascii::{decode_words, encode_words};

pub struct LocalStorage {
    store: Box<dyn KeyValueStore>,
}

impl LocalStorage {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn set(&mut self, key: &str, words: &[u32]) {
        if let Err(e) = self.store.set(key, encode_words(words)) {
            log::warn!("local storage set({key:?}) failed: {e}");
        }
    }

    /// Stored words for `key`; empty when absent.
    pub fn get(&self, key: &str) -> Vec<u32> {
        match self.store.get(key) {
            Ok(Some(encoded)) => decode_words(&encoded),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("local storage get({key:?}) failed: {e}");
                Vec::new()
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            log::warn!("local storage remove({key:?}) failed: {e}");
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.store.clear() {
            log::warn!("local storage clear failed: {e}");
        }
    }
}
