//! Server-side document storage.

use parking_lot::RwLock;
use std::collections::HashMap;

/// A user's document as held by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Current version.
    pub version: u64,
    /// Current content.
    pub content: String,
}

impl Document {
    /// Creates a document.
    pub fn new(version: u64, content: impl Into<String>) -> Self {
        Self {
            version,
            content: content.into(),
        }
    }
}

/// Result of applying a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The edit was stored (or there was nothing to store).
    Accepted {
        /// Version after the push.
        version: u64,
    },
    /// The client pushed against a stale version. Holds the current document.
    Conflict(Document),
}

/// Per-user documents with optimistic version checks.
///
/// A user without a document reads as an empty document at the initial
/// version.
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Document>>,
    initial_version: u64,
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new(initial_version: u64) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            initial_version,
        }
    }

    /// Returns the user's document.
    pub fn get(&self, user_id: &str) -> Document {
        self.documents
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Document::new(self.initial_version, ""))
    }

    /// Replaces the user's document.
    pub fn insert(&self, user_id: impl Into<String>, document: Document) {
        self.documents.write().insert(user_id.into(), document);
    }

    /// Returns the user's document if the client's version is out of date.
    pub fn pull(&self, user_id: &str, client_version: u64) -> Option<Document> {
        let document = self.get(user_id);
        (document.version != client_version).then_some(document)
    }

    /// Applies a push made against `client_version`.
    ///
    /// A push without content only confirms the client's version.
    pub fn push(&self, user_id: &str, client_version: u64, content: Option<&str>) -> PushOutcome {
        let mut documents = self.documents.write();
        let document = documents
            .entry(user_id.to_string())
            .or_insert_with(|| Document::new(self.initial_version, ""));

        if document.version != client_version {
            return PushOutcome::Conflict(document.clone());
        }

        if let Some(content) = content {
            document.version += 1;
            document.content = content.to_string();
        }
        PushOutcome::Accepted {
            version: document.version,
        }
    }

    /// Returns true if the user has a stored document.
    pub fn contains(&self, user_id: &str) -> bool {
        self.documents.read().contains_key(user_id)
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(1)
    }
}
