//! In-memory store for testing.

use crate::error::{StoreError, StoreResult};
use crate::record::{LocalRecord, RecordPatch};
use crate::store::LocalStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An in-memory local store.
///
/// Suitable for unit tests, integration tests and sessions that do not need
/// to survive a restart. Counts writes so tests can assert on write-through.
///
/// # Example
///
/// ```rust
/// use padsync_store::{LocalRecord, LocalStore, MemoryStore};
///
/// let store = MemoryStore::with_record("7", LocalRecord::new(2, "cached"));
/// assert_eq!(store.get("7").unwrap().unwrap().content, "cached");
/// assert_eq!(store.get("8").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, LocalRecord>>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    /// Creates a store holding one record.
    #[must_use]
    pub fn with_record(user_id: impl Into<String>, record: LocalRecord) -> Self {
        let store = Self::new();
        store.records.write().insert(user_id.into(), record);
        store
    }

    /// Marks the store available or unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns the number of successful `set` calls.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn get(&self, user_id: &str) -> StoreResult<Option<LocalRecord>> {
        Ok(self.records.read().get(user_id).cloned())
    }

    fn set(&self, user_id: &str, patch: RecordPatch) -> StoreResult<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))?;
        record.apply(&patch);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn register(&self, user_id: &str, record: LocalRecord) -> StoreResult<bool> {
        let mut records = self.records.write();
        if records.contains_key(user_id) {
            return Ok(false);
        }
        records.insert(user_id.to_string(), record);
        Ok(true)
    }

    fn remove(&self, user_id: &str) -> StoreResult<bool> {
        Ok(self.records.write().remove(user_id).is_some())
    }
}
