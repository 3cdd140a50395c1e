//! Configuration for the sync engine.

use padsync_protocol::{DEFAULT_SYNC_PATH, DEFAULT_UPDATE_PATH, STATUS_OK};

/// Configuration for sync operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Path of the pull endpoint.
    pub sync_path: String,
    /// Path of the push endpoint.
    pub update_path: String,
    /// The only status code treated as success.
    pub success_status: u16,
    /// How many times one edit may be re-pushed after the decision source
    /// chose to override the server.
    pub max_conflict_retries: u32,
    /// Report the mirrored content when a pull fails in local mode.
    pub offline_fallback: bool,
}

impl SyncConfig {
    /// Creates a configuration with the default endpoints.
    pub fn new() -> Self {
        Self {
            sync_path: DEFAULT_SYNC_PATH.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
            success_status: STATUS_OK,
            max_conflict_retries: 3,
            offline_fallback: false,
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

    /// Sets the success status code.
    pub fn with_success_status(mut self, status: u16) -> Self {
        self.success_status = status;
        self
    }

    /// Sets the conflict retry cap.
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Enables or disables the offline fallback for failed pulls.
    pub fn with_offline_fallback(mut self, enabled: bool) -> Self {
        self.offline_fallback = enabled;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.sync_path, "sync");
        assert_eq!(config.update_path, "update");
        assert_eq!(config.success_status, 200);
        assert_eq!(config.max_conflict_retries, 3);
        assert!(!config.offline_fallback);
    }

    #[test]
    fn config_builder() {
        let config = SyncConfig::new()
            .with_sync_path("api/sync.php")
            .with_update_path("api/update.php")
            .with_max_conflict_retries(1)
            .with_offline_fallback(true);

        assert_eq!(config.sync_path, "api/sync.php");
        assert_eq!(config.update_path, "api/update.php");
        assert_eq!(config.max_conflict_retries, 1);
        assert!(config.offline_fallback);
    }
}
