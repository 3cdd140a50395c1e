//! # padsync Protocol
//!
//! Wire types for the padsync single-record sync protocol.
//!
//! This crate provides:
//! - `SyncRequest` describing a pull (`GET sync`) or push (`POST update`)
//! - `TransportResponse` as delivered by a transport
//! - `ServerResponse` parsing and encoding of newline-delimited bodies
//! - `Conflict` and `ConflictResolution` for the push path
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Wire format
//!
//! A response body is newline-delimited text. The first line, when present
//! and non-empty, is the decimal version of the record on the server. All
//! remaining lines, rejoined with `\n`, are the record content. An empty body
//! carries neither a version nor content.
//!
//! ```rust
//! use padsync_protocol::ServerResponse;
//!
//! let response = ServerResponse::parse_body("7\nhello\nworld").unwrap();
//! assert_eq!(response.version, Some(7));
//! assert_eq!(response.content.as_deref(), Some("hello\nworld"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod error;
mod request;
mod response;

pub use conflict::{Conflict, ConflictPolicy, ConflictResolution};
pub use error::{ProtocolError, ProtocolResult};
pub use request::{
    Method, SyncRequest, DEFAULT_SYNC_PATH, DEFAULT_UPDATE_PATH, USER_HEADER, VERSION_PARAM,
};
pub use response::{parse_response, ServerResponse, TransportResponse, STATUS_OK};
