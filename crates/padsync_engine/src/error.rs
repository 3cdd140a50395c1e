//! Error types for the sync engine.

use padsync_protocol::ProtocolError;
use padsync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Only `IdentityUnresolved` and `Store` escape from engine construction.
/// Everything that happens after a request is issued is absorbed by the
/// engine, recorded in `SyncStats::last_error` and surfaced to the caller as
/// a `None` result.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No user could be attributed to this session.
    #[error("identity could not be resolved: {0}")]
    IdentityUnresolved(String),

    /// Local store error.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// The server could not be reached, refused the request, or answered
    /// with a malformed body.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The decision source kept overriding the server past the retry cap.
    #[error("conflict retry limit reached after {attempts} attempts")]
    ConflictRetryLimit {
        /// Retries already performed for this edit.
        attempts: u32,
    },
}

impl SyncError {
    /// Returns true if calling `sync()` again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Protocol(e) => e.is_offline(),
            SyncError::ConflictRetryLimit { .. } => true,
            SyncError::IdentityUnresolved(_) | SyncError::Store(_) => false,
        }
    }

    /// Returns true if the engine cannot be used at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::IdentityUnresolved(_))
    }
}
