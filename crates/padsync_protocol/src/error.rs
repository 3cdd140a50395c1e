//! Error types for response handling.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors produced while turning a transport response into a `ServerResponse`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The transport could not complete the request (no status at all).
    #[error("could not connect to server")]
    Unreachable,

    /// The server answered with a status other than the success code.
    #[error("unexpected response: {status} {status_text}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// HTTP status text.
        status_text: String,
    },

    /// The first body line was present but not a decimal version.
    #[error("malformed version line: {0:?}")]
    MalformedVersion(String),

    /// A request query parameter could not be interpreted.
    #[error("invalid query parameter {name}: {value:?}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Raw value.
        value: String,
    },
}

impl ProtocolError {
    /// Returns true if this error means the server is unreachable or refused
    /// the request, i.e. the client should consider itself offline.
    pub fn is_offline(&self) -> bool {
        matches!(self, ProtocolError::Unreachable | ProtocolError::Rejected { .. })
    }
}
