//! Content-addressed keys for rendered artefacts.
//!
//! Keys are BLAKE3 digests over a typed, length-delimited feed of every
//! field that influences pixel output. Two inputs that differ in any fed
//! field produce different keys; fields left out of the feed are by
//! construction irrelevant to the cache.

use crate::types::Color;

/// 32-byte content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Digest of a single string.
    pub fn of_str(value: &str) -> Self {
        let mut hasher = ContentHasher::new("str");
        hasher.str(value);
        hasher.finish()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, for logging.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Incremental structural hasher. Each field is tagged by its type and
/// strings are length-prefixed, so field boundaries cannot collide.
pub struct ContentHasher {
    inner: blake3::Hasher,
}

impl ContentHasher {
    /// Start a digest in the given domain (e.g. `"text"`, `"image"`).
    pub fn new(domain: &str) -> Self {
        let mut inner = blake3::Hasher::new();
        inner.update(&(domain.len() as u64).to_le_bytes());
        inner.update(domain.as_bytes());
        Self { inner }
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.inner.update(&[b'i']);
        self.inner.update(&value.to_le_bytes());
        self
    }

    /// Hashes the bit pattern, so `0.0` and `-0.0` are distinct keys.
    pub fn float(&mut self, value: f32) -> &mut Self {
        self.inner.update(&[b'f']);
        self.inner.update(&value.to_bits().to_le_bytes());
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.inner.update(&[b'b', value as u8]);
        self
    }

    pub fn color(&mut self, value: Color) -> &mut Self {
        self.inner.update(&[b'c', value.r, value.g, value.b, value.a]);
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.inner.update(&[b's']);
        self.inner.update(&(value.len() as u64).to_le_bytes());
        self.inner.update(value.as_bytes());
        self
    }

    pub fn digest(&mut self, value: &ContentHash) -> &mut Self {
        self.inner.update(&[b'h']);
        self.inner.update(&value.0);
        self
    }

    pub fn finish(&self) -> ContentHash {
        ContentHash(*self.inner.finalize().as_bytes())
    }
}
