//! Bridge error types.

use canopy_hostapi::HostError;
use canopy_primitives::CodecError;

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Wasmtime engine, compilation, linking or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, unknown imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Host capability error outside of a guest call.
    #[error("host error: {0}")]
    HostError(#[from] HostError),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    ConfigError(String),

    /// Guest memory is missing or unusable.
    #[error("memory error: {0}")]
    MemoryError(String),

    /// A guest call aborted on a fatal wire fault (overflow, bad address,
    /// invalid code point).
    #[error("wire fault: {0}")]
    WireFault(CodecError),

    /// An optional entry point was called but the guest does not export it.
    #[error("guest does not export '{0}'")]
    MissingExport(String),

    /// Fuel exhausted during a guest call.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// The guest called `process_exit`.
    #[error("guest exited with code {0}")]
    GuestExited(i32),

    /// WASM guest trapped.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}

impl From<serde_json::Error> for SandboxError {
    fn from(e: serde_json::Error) -> Self {
        SandboxError::ConfigError(e.to_string())
    }
}

/// Raised inside `process_exit` to unwind the current guest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("guest requested exit with code {0}")]
pub struct GuestExit(pub i32);
