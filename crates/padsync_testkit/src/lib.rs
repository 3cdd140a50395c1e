//! # padsync Testkit
//!
//! Test utilities for padsync.
//!
//! This crate provides:
//! - Result recorders and end-to-end session fixtures
//! - Scripted conflict decision sources
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use padsync_testkit::prelude::*;
//!
//! let session = Session::online("42");
//! session.server.seed("42", 3, "initial content");
//! session.engine.sync(None);
//! assert_eq!(session.sink.last(), Some("initial content".to_string()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decisions;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::decisions::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use decisions::*;
pub use fixtures::*;
pub use generators::*;
