//! Sync state snapshots and statistics.

use std::time::Instant;

/// Which request, if any, the engine is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No request outstanding.
    #[default]
    Idle,
    /// Waiting on a pull (`GET sync`).
    Pulling,
    /// Waiting on a push (`POST update`).
    Pushing,
}

impl SyncPhase {
    /// Returns true if a request is outstanding.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncPhase::Pulling | SyncPhase::Pushing)
    }
}

/// A snapshot of the reconciliation state.
///
/// Exposed for diagnostics and tests; not part of the reconciliation
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    /// Last version known to match the server.
    pub version: u64,
    /// An edit exists that the server has not confirmed.
    pub dirty: bool,
    /// The last completed request reached the server and was accepted.
    pub online: bool,
    /// A local mirror exists for the current user.
    pub local_mode: bool,
    /// No `sync()` call has made its branch decision yet.
    pub first_run: bool,
    /// Current phase.
    pub phase: SyncPhase,
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Pull requests issued.
    pub pulls: u64,
    /// Push requests issued.
    pub pushes: u64,
    /// Conflicts detected on push.
    pub conflicts: u64,
    /// Re-pushes after the decision source kept the local edit.
    pub conflict_retries: u64,
    /// Outstanding requests cancelled by a newer request.
    pub cancelled_requests: u64,
    /// Completions discarded because a newer request superseded them.
    pub superseded_responses: u64,
    /// Requests that failed (unreachable, rejected, malformed).
    pub failures: u64,
    /// Results delivered to the result callback.
    pub results_reported: u64,
    /// Last successful round trip.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_checks() {
        assert!(!SyncPhase::Idle.is_active());
        assert!(SyncPhase::Pulling.is_active());
        assert!(SyncPhase::Pushing.is_active());
        assert_eq!(SyncPhase::default(), SyncPhase::Idle);
    }
}
