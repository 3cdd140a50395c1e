//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store file could not be encoded or decoded.
    #[error("store file corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    /// Another process holds the store lock.
    #[error("store is locked by another process")]
    Locked,

    /// The store is not available in this environment.
    #[error("local store unavailable")]
    Unavailable,

    /// No record exists for the user.
    #[error("no local record for user {0}")]
    UnknownUser(String),

    /// The store file was written by an unsupported format version.
    #[error("unsupported store format version {found}, expected {expected}")]
    UnsupportedFormat {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}
