//! # padsync Sync Server
//!
//! Reference in-process server for the padsync single-record protocol.
//!
//! This crate provides:
//! - The `sync` (pull) and `update` (push) endpoints
//! - Per-user documents with optimistic version checks
//! - Error mapping to HTTP status codes
//! - An offline switch for exercising connectivity loss
//!
//! # Protocol
//!
//! - `GET sync?version=N` returns `"<version>\n<content>"` when `N` differs
//!   from the server's version, and an empty body otherwise.
//! - `POST update?version=N` with the edit as body stores the edit when `N`
//!   matches, bumps the version and returns `"<version>"`. On a mismatch the
//!   edit is rejected and the current `"<version>\n<content>"` is returned.
//!
//! Every request names its user in the `X-Padsync-User` header.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod documents;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use documents::{Document, DocumentStore, PushOutcome};
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use server::PadServer;
