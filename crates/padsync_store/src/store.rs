//! Local store trait definition.

use crate::error::{StoreError, StoreResult};
use crate::record::{LocalRecord, RecordPatch};
use std::sync::Arc;

/// A per-user mirror of the pad record.
///
/// # Invariants
///
/// - `set` applies only the fields present in the patch
/// - `set` on a user without a record fails with `UnknownUser`
/// - `register` never overwrites an existing record
/// - Stores must be `Send + Sync`; the engine may call them from transport
///   completion threads
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent mirrors
/// - [`super::NoLocalStore`] - For server-only sessions
pub trait LocalStore: Send + Sync {
    /// Returns true if the store can be used at all.
    ///
    /// An unavailable store keeps the engine in server mode even if it
    /// happens to hold a record.
    fn is_available(&self) -> bool {
        true
    }

    /// Reads the record for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, user_id: &str) -> StoreResult<Option<LocalRecord>>;

    /// Applies a partial update to a user's record.
    ///
    /// # Errors
    ///
    /// Returns `UnknownUser` if the user has no record, or a storage error.
    fn set(&self, user_id: &str, patch: RecordPatch) -> StoreResult<()>;

    /// Creates a record for a user if none exists.
    ///
    /// Returns true if the record was inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn register(&self, user_id: &str, record: LocalRecord) -> StoreResult<bool>;

    /// Removes a user's record.
    ///
    /// Returns true if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn remove(&self, user_id: &str) -> StoreResult<bool>;
}

impl<S: LocalStore + ?Sized> LocalStore for Arc<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get(&self, user_id: &str) -> StoreResult<Option<LocalRecord>> {
        (**self).get(user_id)
    }

    fn set(&self, user_id: &str, patch: RecordPatch) -> StoreResult<()> {
        (**self).set(user_id, patch)
    }

    fn register(&self, user_id: &str, record: LocalRecord) -> StoreResult<bool> {
        (**self).register(user_id, record)
    }

    fn remove(&self, user_id: &str) -> StoreResult<bool> {
        (**self).remove(user_id)
    }
}

/// A store for hosts without local persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocalStore;

impl LocalStore for NoLocalStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _user_id: &str) -> StoreResult<Option<LocalRecord>> {
        Ok(None)
    }

    fn set(&self, _user_id: &str, _patch: RecordPatch) -> StoreResult<()> {
        Err(StoreError::Unavailable)
    }

    fn register(&self, _user_id: &str, _record: LocalRecord) -> StoreResult<bool> {
        Err(StoreError::Unavailable)
    }

    fn remove(&self, _user_id: &str) -> StoreResult<bool> {
        Ok(false)
    }
}
