//! # padsync Store
//!
//! Local mirror stores for padsync.
//!
//! A local store keeps, per user, the last known server version, whether an
//! unconfirmed local edit exists, and the content itself. A user with a
//! record in the store is a "local mode" user: the sync engine writes every
//! edit through to the store and falls back to it when the server has
//! nothing newer to report.
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral sessions
//! - [`FileStore`] - JSON file in a locked directory, survives restarts
//! - [`NoLocalStore`] - Always unavailable; the engine runs in server mode
//!
//! ## Example
//!
//! ```rust
//! use padsync_store::{LocalRecord, LocalStore, MemoryStore, RecordPatch};
//!
//! let store = MemoryStore::new();
//! store.register("42", LocalRecord::new(3, "hello")).unwrap();
//! store.set("42", RecordPatch::new().dirty(true).content("hello, world")).unwrap();
//!
//! let record = store.get("42").unwrap().unwrap();
//! assert_eq!(record.version, 3);
//! assert!(record.dirty);
//! assert_eq!(record.content, "hello, world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod record;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{LocalRecord, RecordPatch};
pub use store::{LocalStore, NoLocalStore};
