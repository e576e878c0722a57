//! Error types for the guest/host wire layer.
//!
//! Every variant here is fatal from the bridge's point of view: the guest has
//! no error channel, so the sandbox turns a `CodecError` into a trap that
//! aborts the current entry-point call.

/// Failure while reading or writing guest linear memory through the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A word address at or past the end of linear memory was dereferenced.
    #[error("address {addr} out of bounds (memory holds {len} words)")]
    OutOfBounds { addr: u64, len: usize },

    /// A write would push the cursor past the buffer's declared capacity.
    #[error("buffer overflow: {required} words required, capacity is {capacity}")]
    Overflow { required: u32, capacity: u32 },

    /// A read went past the end of the buffer's declared size.
    #[error("buffer exhausted after {size} words")]
    Exhausted { size: u32 },

    /// A string contained a word that is not a Unicode scalar value.
    #[error("invalid code point {0:#x} in guest string")]
    InvalidCodePoint(u32),

    /// A negative value was passed where a word address or length is expected.
    #[error("negative address or length: {0}")]
    NegativeAddress(i32),
}

/// Convenience result type for the codec layer.
pub type CodecResult<T> = Result<T, CodecError>;
