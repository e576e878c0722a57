//! Text key/value persistence abstraction.
//!
//! Backs the guest's local storage. Values are printable text; the bridge
//! encodes word arrays into text before storing them.
//!
//! Implementations:
//! - `MemStore` (this crate), in-memory and shareable between clones
//! - browser-style local storage or a settings file, provided by embedders

use crate::error::HostError;

/// Abstraction over a persistent string-to-string map.
pub trait KeyValueStore: Send {
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Insert or overwrite.
    fn set(&mut self, key: &str, value: String) -> Result<(), HostError>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), HostError>;

    fn clear(&mut self) -> Result<(), HostError>;

    /// Default implementation uses `get()`, but backends may optimize this.
    fn contains(&self, key: &str) -> Result<bool, HostError> {
        Ok(self.get(key)?.is_some())
    }
}
