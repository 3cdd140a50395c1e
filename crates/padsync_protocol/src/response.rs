//! Transport responses and server response bodies.

use crate::error::{ProtocolError, ProtocolResult};

/// The only status code treated as success.
pub const STATUS_OK: u16 = 200;

/// A completed transport round trip, as delivered to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, or `None` if the transport could not complete at all.
    pub status: Option<u16>,
    /// HTTP status text.
    pub status_text: String,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Creates a `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: Some(STATUS_OK),
            status_text: "OK".into(),
            body: body.into(),
        }
    }

    /// Creates a response with an explicit status.
    pub fn with_status(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Creates a response for a request that never reached the server.
    pub fn unreachable() -> Self {
        Self {
            status: None,
            status_text: String::new(),
            body: String::new(),
        }
    }
}

/// A parsed server response body.
///
/// `content: None` (the server sent no content lines) is distinct from
/// `content: Some("")` (the server sent an empty content line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerResponse {
    /// Version of the record on the server, if reported.
    pub version: Option<u64>,
    /// Content of the record on the server, if reported.
    pub content: Option<String>,
}

impl ServerResponse {
    /// Creates a response.
    pub fn new(version: Option<u64>, content: Option<String>) -> Self {
        Self { version, content }
    }

    /// A response that only reports a version (accepted without echo).
    pub fn version_only(version: u64) -> Self {
        Self {
            version: Some(version),
            content: None,
        }
    }

    /// A response carrying both version and content.
    pub fn with_content(version: u64, content: impl Into<String>) -> Self {
        Self {
            version: Some(version),
            content: Some(content.into()),
        }
    }

    /// Parses a newline-delimited body.
    ///
    /// # Errors
    ///
    /// Returns `MalformedVersion` if the first line is non-empty but not a
    /// decimal integer.
    pub fn parse_body(body: &str) -> ProtocolResult<Self> {
        let (first, content) = match body.split_once('\n') {
            Some((first, rest)) => (first, Some(rest.to_string())),
            None => (body, None),
        };

        let first = first.trim();
        let version = if first.is_empty() {
            None
        } else {
            Some(
                first
                    .parse::<u64>()
                    .map_err(|_| ProtocolError::MalformedVersion(first.to_string()))?,
            )
        };

        Ok(Self { version, content })
    }

    /// Encodes this response as a body that `parse_body` reads back unchanged.
    pub fn encode(&self) -> String {
        let mut body = self.version.map(|v| v.to_string()).unwrap_or_default();
        if let Some(content) = &self.content {
            body.push('\n');
            body.push_str(content);
        }
        body
    }

    /// Returns true if neither version nor content was reported.
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.content.is_none()
    }
}

/// Interprets a transport response.
///
/// # Errors
///
/// - `Unreachable` when the transport produced no status
/// - `Rejected` when the status is not `success_status`
/// - `MalformedVersion` when the body's version line is not a whole decimal
///   integer. A leading number followed by other text, such as `3abc`, is
///   rejected rather than read as version 3.
pub fn parse_response(
    response: &TransportResponse,
    success_status: u16,
) -> ProtocolResult<ServerResponse> {
    let status = response.status.ok_or(ProtocolError::Unreachable)?;
    if status != success_status {
        return Err(ProtocolError::Rejected {
            status,
            status_text: response.status_text.clone(),
        });
    }
    ServerResponse::parse_body(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_version_and_multiline_content() {
        let response = ServerResponse::parse_body("7\nhello\nworld").unwrap();
        assert_eq!(response.version, Some(7));
        assert_eq!(response.content.as_deref(), Some("hello\nworld"));
    }

    #[test]
    fn parse_empty_body() {
        let response = ServerResponse::parse_body("").unwrap();
        assert_eq!(response, ServerResponse::default());
        assert!(response.is_empty());
    }

    #[test]
    fn parse_version_only() {
        let response = ServerResponse::parse_body("7").unwrap();
        assert_eq!(response.version, Some(7));
        assert_eq!(response.content, None);
    }

    #[test]
    fn empty_content_is_not_absent_content() {
        let response = ServerResponse::parse_body("7\n").unwrap();
        assert_eq!(response.version, Some(7));
        assert_eq!(response.content.as_deref(), Some(""));
    }

    #[test]
    fn empty_first_line_means_no_version() {
        let response = ServerResponse::parse_body("\nbody").unwrap();
        assert_eq!(response.version, None);
        assert_eq!(response.content.as_deref(), Some("body"));
    }

    #[test]
    fn version_line_tolerates_carriage_return() {
        let response = ServerResponse::parse_body("12\r\ntext").unwrap();
        assert_eq!(response.version, Some(12));
        assert_eq!(response.content.as_deref(), Some("text"));
    }

    #[test]
    fn malformed_version_is_an_error() {
        let err = ServerResponse::parse_body("<html>\n</html>").unwrap_err();
        assert_eq!(err, ProtocolError::MalformedVersion("<html>".into()));
    }

    #[test]
    fn trailing_garbage_on_version_line_is_rejected() {
        let result = parse_response(&TransportResponse::ok("3abc\ntext"), STATUS_OK);
        assert_eq!(result, Err(ProtocolError::MalformedVersion("3abc".into())));
    }

    #[test]
    fn encode_matches_wire_format() {
        assert_eq!(ServerResponse::with_content(3, "a\nb").encode(), "3\na\nb");
        assert_eq!(ServerResponse::version_only(4).encode(), "4");
        assert_eq!(ServerResponse::default().encode(), "");
    }

    #[test]
    fn missing_status_is_unreachable() {
        let result = parse_response(&TransportResponse::unreachable(), STATUS_OK);
        assert_eq!(result, Err(ProtocolError::Unreachable));
    }

    #[test]
    fn non_success_status_is_rejected() {
        let response = TransportResponse::with_status(503, "Service Unavailable", "3\nbusy");
        let result = parse_response(&response, STATUS_OK);
        assert_eq!(
            result,
            Err(ProtocolError::Rejected {
                status: 503,
                status_text: "Service Unavailable".into(),
            })
        );
    }

    #[test]
    fn success_status_parses_body() {
        let result = parse_response(&TransportResponse::ok("3\ninitial content"), STATUS_OK);
        assert_eq!(result, Ok(ServerResponse::with_content(3, "initial content")));
    }

    proptest! {
        #[test]
        fn encoded_responses_parse_back(
            version in proptest::option::of(any::<u64>()),
            content in proptest::option::of(".*"),
        ) {
            let response = ServerResponse::new(version, content);
            let parsed = ServerResponse::parse_body(&response.encode()).unwrap();
            prop_assert_eq!(parsed, response);
        }

        #[test]
        fn parsing_never_panics(body in "\\PC*") {
            let _ = ServerResponse::parse_body(&body);
        }
    }
}
