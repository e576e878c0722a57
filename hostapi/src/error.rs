//! Host-side error type for the canopy bridge.
//!
//! `HostError` is returned by host capability implementations (transport,
//! storage, image loading). None of these reach the guest: the services
//! that call them log the failure and fall back to "no data".

/// Failure reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The named resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was refused before any I/O, e.g. a path escaping its root.
    #[error("rejected: {0}")]
    Rejected(String),

    /// An I/O operation failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A transport operation failed (connect, listen, send).
    #[error("transport error: {0}")]
    Transport(String),

    /// Image decoding or conversion failed.
    #[error("image error: {0}")]
    Image(String),

    /// Anything else.
    #[error("internal host error: {0}")]
    Internal(String),
}

impl HostError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<image::ImageError> for HostError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
