//! Request handlers for the sync endpoints.

use crate::config::ServerConfig;
use crate::documents::{DocumentStore, PushOutcome};
use crate::error::{ServerError, ServerResult};
use padsync_protocol::{Method, ServerResponse, SyncRequest};
use std::sync::Arc;
use tracing::debug;

/// Handler for sync requests.
pub struct RequestHandler {
    config: ServerConfig,
    documents: Arc<DocumentStore>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(config: ServerConfig, documents: Arc<DocumentStore>) -> Self {
        Self { config, documents }
    }

    /// Returns the handler configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Routes a request to its endpoint.
    ///
    /// # Errors
    ///
    /// - `UnknownPath` / `MethodNotAllowed` for requests no endpoint serves
    /// - `MissingUser` if the user header is absent or empty
    /// - `InvalidRequest` if the version parameter is missing or malformed
    /// - `ContentTooLarge` for oversized pushes
    pub fn dispatch(&self, request: &SyncRequest) -> ServerResult<ServerResponse> {
        let is_pull = request.path == self.config.sync_path;
        let is_push = request.path == self.config.update_path;

        match (request.method, is_pull, is_push) {
            (Method::Get, true, _) | (Method::Post, _, true) => {}
            (method, true, _) | (method, _, true) => {
                return Err(ServerError::MethodNotAllowed {
                    method: method.to_string(),
                    path: request.path.clone(),
                })
            }
            _ => return Err(ServerError::UnknownPath(request.path.clone())),
        }

        let user_id = request.user_id().ok_or(ServerError::MissingUser)?;
        let version = request
            .version()
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
            .ok_or_else(|| ServerError::InvalidRequest("missing version".into()))?;

        match request.method {
            Method::Get => self.handle_pull(user_id, version),
            Method::Post => self.handle_push(user_id, version, request.body.as_deref()),
        }
    }

    /// Handles a pull.
    ///
    /// Returns the document when the client's version is out of date and an
    /// empty response otherwise.
    pub fn handle_pull(&self, user_id: &str, client_version: u64) -> ServerResult<ServerResponse> {
        let response = match self.documents.pull(user_id, client_version) {
            Some(document) => ServerResponse::with_content(document.version, document.content),
            None => ServerResponse::default(),
        };
        debug!(user = user_id, client_version, changed = !response.is_empty(), "pull");
        Ok(response)
    }

    /// Handles a push.
    ///
    /// An accepted push answers with the new version alone. A push against a
    /// stale version answers with the current version and content.
    pub fn handle_push(
        &self,
        user_id: &str,
        client_version: u64,
        content: Option<&str>,
    ) -> ServerResult<ServerResponse> {
        if let Some(content) = content {
            if content.len() > self.config.max_content_len {
                return Err(ServerError::ContentTooLarge {
                    len: content.len(),
                    max: self.config.max_content_len,
                });
            }
        }

        match self.documents.push(user_id, client_version, content) {
            PushOutcome::Accepted { version } => {
                debug!(user = user_id, client_version, version, "push accepted");
                Ok(ServerResponse::version_only(version))
            }
            PushOutcome::Conflict(document) => {
                debug!(
                    user = user_id,
                    client_version,
                    server_version = document.version,
                    "push conflicted"
                );
                Ok(ServerResponse::with_content(document.version, document.content))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use padsync_protocol::USER_HEADER;

    fn create_handler() -> (RequestHandler, Arc<DocumentStore>) {
        let documents = Arc::new(DocumentStore::default());
        documents.insert("42", Document::new(3, "hello"));
        let handler = RequestHandler::new(ServerConfig::default(), Arc::clone(&documents));
        (handler, documents)
    }

    fn pull(version: u64) -> SyncRequest {
        SyncRequest::pull("sync", version).with_header(USER_HEADER, "42")
    }

    fn push(version: u64, body: &str) -> SyncRequest {
        SyncRequest::push("update", version, Some(body.to_string())).with_header(USER_HEADER, "42")
    }

    #[test]
    fn pull_stale_client() {
        let (handler, _) = create_handler();
        let response = handler.dispatch(&pull(0)).unwrap();
        assert_eq!(response, ServerResponse::with_content(3, "hello"));
    }

    #[test]
    fn pull_current_client() {
        let (handler, _) = create_handler();
        assert!(handler.dispatch(&pull(3)).unwrap().is_empty());
    }

    #[test]
    fn push_accepted() {
        let (handler, documents) = create_handler();
        let response = handler.dispatch(&push(3, "edited")).unwrap();
        assert_eq!(response, ServerResponse::version_only(4));
        assert_eq!(documents.get("42"), Document::new(4, "edited"));
    }

    #[test]
    fn push_conflict() {
        let (handler, documents) = create_handler();
        let response = handler.dispatch(&push(2, "stale edit")).unwrap();
        assert_eq!(response, ServerResponse::with_content(3, "hello"));
        assert_eq!(documents.get("42").content, "hello");
    }

    #[test]
    fn missing_user() {
        let (handler, _) = create_handler();
        let request = SyncRequest::pull("sync", 0);
        assert_eq!(handler.dispatch(&request), Err(ServerError::MissingUser));
    }

    #[test]
    fn bad_version() {
        let (handler, _) = create_handler();
        let mut request = pull(0);
        request.query = vec![("version".into(), "abc".into())];
        assert!(matches!(
            handler.dispatch(&request),
            Err(ServerError::InvalidRequest(_))
        ));

        request.query.clear();
        assert!(matches!(
            handler.dispatch(&request),
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn oversized_push() {
        let documents = Arc::new(DocumentStore::default());
        let handler = RequestHandler::new(
            ServerConfig::default().with_max_content_len(4),
            documents,
        );
        assert_eq!(
            handler.dispatch(&push(1, "too long")),
            Err(ServerError::ContentTooLarge { len: 8, max: 4 })
        );
    }

    #[test]
    fn routing_errors() {
        let (handler, _) = create_handler();
        let unknown = SyncRequest::pull("elsewhere", 0).with_header(USER_HEADER, "42");
        assert_eq!(
            handler.dispatch(&unknown),
            Err(ServerError::UnknownPath("elsewhere".into()))
        );

        let wrong_method = SyncRequest::pull("update", 0).with_header(USER_HEADER, "42");
        assert!(matches!(
            handler.dispatch(&wrong_method),
            Err(ServerError::MethodNotAllowed { .. })
        ));
    }
}
