//! Mirror registration commands.

use padsync_engine::Identity;
use padsync_store::{FileStore, LocalRecord, LocalStore};
use std::path::Path;
use tracing::info;

/// Registers a user in the mirror directory.
///
/// Engines created for this user afterwards run in local mode. An existing
/// record is left untouched.
pub fn go_local(
    path: &Path,
    identity: &Identity,
    version: u64,
    content: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;

    if store.register(&identity.user_id, LocalRecord::new(version, content))? {
        info!(user = %identity.user_id, version, "registered mirrored record");
        println!(
            "Registered user {} at version {} in {}",
            identity.user_id,
            version,
            store.path().display()
        );
    } else {
        println!("User {} is already mirrored", identity.user_id);
    }

    Ok(())
}

/// Drops a user's mirrored record.
pub fn forget(path: &Path, identity: &Identity) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;

    if store.remove(&identity.user_id)? {
        info!(user = %identity.user_id, "removed mirrored record");
        println!("Removed mirrored record for user {}", identity.user_id);
    } else {
        println!("User {} was not mirrored", identity.user_id);
    }

    Ok(())
}
