//! Error types for the sync server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The request did not name a user.
    #[error("missing user")]
    MissingUser,

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The pushed content exceeds the configured limit.
    #[error("content too large: {len} bytes, limit {max}")]
    ContentTooLarge {
        /// Length of the pushed content.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// No endpoint at this path.
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// The endpoint exists but not for this method.
    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the HTTP status code and reason phrase for this error.
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            ServerError::MissingUser => (403, "Forbidden"),
            ServerError::InvalidRequest(_) => (400, "Bad Request"),
            ServerError::ContentTooLarge { .. } => (413, "Payload Too Large"),
            ServerError::UnknownPath(_) => (404, "Not Found"),
            ServerError::MethodNotAllowed { .. } => (405, "Method Not Allowed"),
            ServerError::Internal(_) => (500, "Internal Server Error"),
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status().0)
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().0 >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::MissingUser.is_client_error());
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
        assert!(!ServerError::UnknownPath("x".into()).is_server_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(ServerError::MissingUser.status().0, 403);
        assert_eq!(ServerError::InvalidRequest("v".into()).status().0, 400);
        assert_eq!(ServerError::ContentTooLarge { len: 9, max: 8 }.status().0, 413);
        assert_eq!(ServerError::UnknownPath("x".into()).status().0, 404);
    }

    #[test]
    fn error_display() {
        let msg = ServerError::ContentTooLarge { len: 10, max: 5 }.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("5"));
    }
}
