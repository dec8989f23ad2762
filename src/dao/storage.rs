//! Failure type shared by every snapshot store backend.

use std::error::Error;
use thiserror::Error;

/// Result alias for snapshot store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Raised when the snapshot store cannot serve a load or persist, regardless
/// of the underlying medium. Surfaced to clients as a 503.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium failed or produced unreadable data.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failing operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure with context about the failing operation.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
