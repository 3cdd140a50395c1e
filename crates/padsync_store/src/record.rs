//! Local record and partial updates.

use serde::{Deserialize, Serialize};

/// The mirrored state of one user's pad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Last server version this record corresponds to.
    pub version: u64,
    /// Whether the content holds an edit the server has not confirmed.
    pub dirty: bool,
    /// Current content.
    pub content: String,
}

impl LocalRecord {
    /// Creates a clean record.
    pub fn new(version: u64, content: impl Into<String>) -> Self {
        Self {
            version,
            dirty: false,
            content: content.into(),
        }
    }

    /// Applies a patch, leaving fields the patch does not carry untouched.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(version) = patch.version {
            self.version = version;
        }
        if let Some(dirty) = patch.dirty {
            self.dirty = dirty;
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
    }
}

/// A partial update to a `LocalRecord`.
///
/// Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    /// New version.
    pub version: Option<u64>,
    /// New dirty flag.
    pub dirty: Option<bool>,
    /// New content.
    pub content: Option<String>,
}

impl RecordPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version.
    pub fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the version if one is given.
    pub fn maybe_version(mut self, version: Option<u64>) -> Self {
        if version.is_some() {
            self.version = version;
        }
        self
    }

    /// Sets the dirty flag.
    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = Some(dirty);
        self
    }

    /// Sets the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the content if some is given.
    pub fn maybe_content(mut self, content: Option<String>) -> Self {
        if content.is_some() {
            self.content = content;
        }
        self
    }

    /// Returns true if the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.dirty.is_none() && self.content.is_none()
    }
}
