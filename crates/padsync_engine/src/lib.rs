//! # padsync Sync Engine
//!
//! Client-side reconciler that keeps one locally editable record consistent
//! with a single authoritative server while tolerating lost connectivity.
//!
//! This crate provides:
//! - `SyncEngine`, deciding between push and pull on every `sync()` call
//! - At most one in-flight request, with stale completions discarded
//! - Conflict detection and a pluggable decision source
//! - Write-through to a local mirror and fallback to it when offline
//! - Transport abstraction plus mock and loopback transports
//!
//! ## Architecture
//!
//! Every `sync(update)` call:
//! 1. Marks the record dirty (and writes the edit through in local mode)
//! 2. Cancels the previous request, if still outstanding
//! 3. Pushes when a confirmed first run holds an unconfirmed edit, pulls
//!    otherwise
//! 4. Reports the reconciled content to the result callback
//!
//! ## Key Invariants
//!
//! - Server is authoritative
//! - A superseded request never mutates state or reports a result
//! - Failed requests leave `dirty` and `version` untouched
//! - Identity is resolved before any request is issued

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod decision;
mod engine;
mod error;
mod identity;
mod loopback;
mod state;
mod transport;

pub use config::SyncConfig;
pub use decision::{ConflictDecisionSource, DecisionFn};
pub use engine::{ResultCallback, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use identity::{CookieIdentity, Identity, IdentityProvider, SESSION_COOKIE};
pub use loopback::{LoopbackServer, LoopbackTransport};
pub use state::{SyncPhase, SyncState, SyncStats};
pub use transport::{
    CancelToken, Cancellable, CompletionCallback, MockTransport, NoopCancel, Transport,
};

pub use padsync_protocol::{Conflict, ConflictPolicy, ConflictResolution};
