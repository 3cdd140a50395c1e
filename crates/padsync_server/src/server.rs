//! Main sync server.

use crate::config::ServerConfig;
use crate::documents::{Document, DocumentStore};
use crate::handler::RequestHandler;
use padsync_protocol::{SyncRequest, TransportResponse};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The reference sync server.
///
/// Requests are handled in process and answered with the transport response
/// an HTTP server would produce. While offline, every request completes
/// without a status, as if the server could not be reached.
///
/// # Example
///
/// ```
/// use padsync_protocol::{SyncRequest, USER_HEADER};
/// use padsync_server::{PadServer, ServerConfig};
///
/// let server = PadServer::new(ServerConfig::default());
/// server.seed("42", 3, "initial content");
///
/// let request = SyncRequest::pull("sync", 0).with_header(USER_HEADER, "42");
/// let response = server.handle(&request);
/// assert_eq!(response.status, Some(200));
/// assert_eq!(response.body, "3\ninitial content");
/// ```
pub struct PadServer {
    handler: RequestHandler,
    documents: Arc<DocumentStore>,
    offline: AtomicBool,
    requests: AtomicU64,
}

impl PadServer {
    /// Creates a new sync server.
    pub fn new(config: ServerConfig) -> Self {
        let documents = Arc::new(DocumentStore::new(config.initial_version));
        Self::with_documents(config, documents)
    }

    /// Creates a sync server over an existing document store.
    pub fn with_documents(config: ServerConfig, documents: Arc<DocumentStore>) -> Self {
        let handler = RequestHandler::new(config, Arc::clone(&documents));
        Self {
            handler,
            documents,
            offline: AtomicBool::new(false),
            requests: AtomicU64::new(0),
        }
    }

    /// Handles a request.
    pub fn handle(&self, request: &SyncRequest) -> TransportResponse {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if self.is_offline() {
            debug!(%request, "server offline, dropping request");
            return TransportResponse::unreachable();
        }

        match self.handler.dispatch(request) {
            Ok(response) => TransportResponse::ok(response.encode()),
            Err(e) => {
                warn!(%request, error = %e, "request rejected");
                let (status, status_text) = e.status();
                TransportResponse::with_status(status, status_text, e.to_string())
            }
        }
    }

    /// Replaces a user's document.
    pub fn seed(&self, user_id: impl Into<String>, version: u64, content: impl Into<String>) {
        self.documents.insert(user_id, Document::new(version, content));
    }

    /// Returns a user's document.
    pub fn document(&self, user_id: &str) -> Document {
        self.documents.get(user_id)
    }

    /// Switches the server offline or back online.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns true if the server is offline.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Returns the number of requests received, including dropped ones.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        self.handler.config()
    }
}

impl Default for PadServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
