//! File-backed store for persistent mirrors.
//!
//! Directory layout:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK              # Advisory lock, one writer process at a time
//! └─ mirror.json       # All user records
//! ```

use crate::error::{StoreError, StoreResult};
use crate::record::{LocalRecord, RecordPatch};
use crate::store::LocalStore;
use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";
const MIRROR_FILE: &str = "mirror.json";
/// Temporary file for atomic mirror writes.
const MIRROR_TEMP: &str = "mirror.json.tmp";

/// Format version written to and expected in `mirror.json`.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct MirrorFile {
    format_version: u32,
    users: BTreeMap<String, LocalRecord>,
}

/// A file-backed local store.
///
/// All records are held in memory and the whole mirror is rewritten on every
/// change using write-then-rename, so a crash leaves either the old or the
/// new file in place.
///
/// # Thread Safety
///
/// The store holds an exclusive lock on its directory for its lifetime.
/// Within the process, internal locking serializes writers.
///
/// # Example
///
/// ```no_run
/// use padsync_store::{FileStore, LocalRecord, LocalStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("pad-mirror")).unwrap();
/// store.register("42", LocalRecord::new(1, "offline copy")).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, LocalRecord>>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - Another process holds the lock (`Locked`)
    /// - The mirror file exists but cannot be decoded
    pub fn open(path: &Path) -> StoreResult<Self> {
        fs::create_dir_all(path)?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let records = Self::load(&path.join(MIRROR_FILE))?;
        debug!(path = %path.display(), users = records.len(), "opened local store");

        Ok(Self {
            path: path.to_path_buf(),
            records: RwLock::new(records),
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the ids of all users with a record.
    pub fn users(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    fn load(mirror_path: &Path) -> StoreResult<BTreeMap<String, LocalRecord>> {
        if !mirror_path.exists() {
            return Ok(BTreeMap::new());
        }

        let data = fs::read(mirror_path)?;
        let mirror: MirrorFile = serde_json::from_slice(&data)?;
        if mirror.format_version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormat {
                found: mirror.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(mirror.users)
    }

    fn persist(&self, records: &BTreeMap<String, LocalRecord>) -> StoreResult<()> {
        let mirror = MirrorFile {
            format_version: FORMAT_VERSION,
            users: records.clone(),
        };
        let data = serde_json::to_vec_pretty(&mirror)?;

        let temp_path = self.path.join(MIRROR_TEMP);
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, self.path.join(MIRROR_FILE))?;
        self.sync_directory()
    }

    /// Makes the rename of the mirror file durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, user_id: &str) -> StoreResult<Option<LocalRecord>> {
        Ok(self.records.read().get(user_id).cloned())
    }

    fn set(&self, user_id: &str, patch: RecordPatch) -> StoreResult<()> {
        let mut records = self.records.write();
        let mut updated = records
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))?;
        updated.apply(&patch);

        let previous = records.insert(user_id.to_string(), updated);
        if let Err(e) = self.persist(&records) {
            // Keep memory and disk in agreement.
            if let Some(previous) = previous {
                records.insert(user_id.to_string(), previous);
            }
            return Err(e);
        }
        Ok(())
    }

    fn register(&self, user_id: &str, record: LocalRecord) -> StoreResult<bool> {
        let mut records = self.records.write();
        if records.contains_key(user_id) {
            return Ok(false);
        }

        records.insert(user_id.to_string(), record);
        if let Err(e) = self.persist(&records) {
            records.remove(user_id);
            return Err(e);
        }
        Ok(true)
    }

    fn remove(&self, user_id: &str) -> StoreResult<bool> {
        let mut records = self.records.write();
        let Some(previous) = records.remove(user_id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&records) {
            records.insert(user_id.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_new_store() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("mirror")).unwrap();
        assert!(store.users().is_empty());
        assert!(dir.path().join("mirror").join(LOCK_FILE).exists());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");

        {
            let store = FileStore::open(&path).unwrap();
            store.register("42", LocalRecord::new(3, "line one\nline two")).unwrap();
            store
                .set("42", RecordPatch::new().dirty(true).content("edited"))
                .unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let record = store.get("42").unwrap().unwrap();
        assert_eq!(record.version, 3);
        assert!(record.dirty);
        assert_eq!(record.content, "edited");
        assert_eq!(store.users(), vec!["42".to_string()]);
    }

    #[test]
    fn persist_replaces_mirror_and_syncs_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");
        let store = FileStore::open(&path).unwrap();

        store.register("42", LocalRecord::new(1, "a")).unwrap();
        store.set("42", RecordPatch::new().version(2)).unwrap();
        store.sync_directory().unwrap();

        assert!(!path.join(MIRROR_TEMP).exists());
        let on_disk: MirrorFile =
            serde_json::from_slice(&fs::read(path.join(MIRROR_FILE)).unwrap()).unwrap();
        assert_eq!(on_disk.users["42"].version, 2);
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");

        let _store = FileStore::open(&path).unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Locked)));
    }

    #[test]
    fn set_unknown_user_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");
        let store = FileStore::open(&path).unwrap();

        let result = store.set("1", RecordPatch::new().dirty(true));
        assert!(matches!(result, Err(StoreError::UnknownUser(_))));
        assert!(!path.join(MIRROR_FILE).exists());
    }

    #[test]
    fn remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");

        {
            let store = FileStore::open(&path).unwrap();
            store.register("1", LocalRecord::new(1, "a")).unwrap();
            store.register("2", LocalRecord::new(1, "b")).unwrap();
            assert!(store.remove("1").unwrap());
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.users(), vec!["2".to_string()]);
    }

    #[test]
    fn corrupted_mirror_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MIRROR_FILE), b"not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mirror");
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join(MIRROR_FILE),
            br#"{"format_version": 7, "users": {}}"#,
        )
        .unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::UnsupportedFormat { found: 7, .. })
        ));
    }
}
