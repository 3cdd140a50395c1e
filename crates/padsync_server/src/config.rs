//! Server configuration.

use padsync_protocol::{DEFAULT_SYNC_PATH, DEFAULT_UPDATE_PATH};

/// Configuration for the sync server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Path of the pull endpoint.
    pub sync_path: String,
    /// Path of the push endpoint.
    pub update_path: String,
    /// Maximum accepted content length in bytes.
    pub max_content_len: usize,
    /// Version assigned to a document on first access.
    pub initial_version: u64,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new() -> Self {
        Self {
            sync_path: DEFAULT_SYNC_PATH.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
            max_content_len: 1024 * 1024,
            initial_version: 1,
        }
    }

    /// Sets the pull endpoint path.
    pub fn with_sync_path(mut self, path: impl Into<String>) -> Self {
        self.sync_path = path.into();
        self
    }

    /// Sets the push endpoint path.
    pub fn with_update_path(mut self, path: impl Into<String>) -> Self {
        self.update_path = path.into();
        self
    }

    /// Sets the maximum content length.
    pub fn with_max_content_len(mut self, max: usize) -> Self {
        self.max_content_len = max;
        self
    }

    /// Sets the version of newly created documents.
    pub fn with_initial_version(mut self, version: u64) -> Self {
        self.initial_version = version;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.sync_path, "sync");
        assert_eq!(config.update_path, "update");
        assert_eq!(config.initial_version, 1);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new()
            .with_sync_path("pull")
            .with_update_path("push")
            .with_max_content_len(16)
            .with_initial_version(0);

        assert_eq!(config.sync_path, "pull");
        assert_eq!(config.update_path, "push");
        assert_eq!(config.max_content_len, 16);
        assert_eq!(config.initial_version, 0);
    }
}
