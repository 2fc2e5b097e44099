//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or invalid credentials. Fatal to backend construction and
    /// never retried.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The key does not resolve to existing content.
    #[error("not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Wrapped provider failure. The provider message is forwarded;
    /// credentials never appear in it.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// Persisted kind tag that no backend recognizes. Treated as a
    /// data-integrity failure, never coerced to a default backend.
    #[error("unknown storage kind: {0}")]
    UnknownKind(String),

    /// A key that does not match its backend's encoding.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A backend call exceeded the caller-applied deadline.
    #[error("storage operation timed out after {secs}s")]
    Timeout {
        /// The deadline that was exceeded, in seconds.
        secs: u64,
    },
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Whether the error should surface as a client-facing 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Backend(err.to_string()),
        }
    }
}
