//! Request descriptions handed to a transport.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;

/// Default path of the pull endpoint.
pub const DEFAULT_SYNC_PATH: &str = "sync";

/// Default path of the push endpoint.
pub const DEFAULT_UPDATE_PATH: &str = "update";

/// Query parameter carrying the client's last known version.
pub const VERSION_PARAM: &str = "version";

/// Header carrying the resolved user id.
pub const USER_HEADER: &str = "X-Padsync-User";

/// HTTP method of a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Pull request.
    Get,
    /// Push request.
    Post,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request issued by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path, relative to the server base.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body. `None` is distinct from an empty body.
    pub body: Option<String>,
}

impl SyncRequest {
    /// Creates a pull request for the given version.
    pub fn pull(path: impl Into<String>, version: u64) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: vec![(VERSION_PARAM.to_string(), version.to_string())],
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a push request for the given version and body.
    pub fn push(path: impl Into<String>, version: u64, body: Option<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: vec![(VERSION_PARAM.to_string(), version.to_string())],
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first query parameter with the given name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the user id carried in the user header, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.header(USER_HEADER).filter(|id| !id.is_empty())
    }

    /// Parses the `version` query parameter.
    ///
    /// Returns `Ok(None)` when the parameter is absent.
    pub fn version(&self) -> ProtocolResult<Option<u64>> {
        match self.query_param(VERSION_PARAM) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ProtocolError::InvalidParameter {
                    name: VERSION_PARAM.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

impl fmt::Display for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}
