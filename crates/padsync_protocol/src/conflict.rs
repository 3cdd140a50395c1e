//! Conflict detection and resolution.

/// A conflict between a pushed local edit and the content the server holds.
///
/// Raised when a push that carried an edit comes back with content, meaning
/// the server did not accept the edit as a simple update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The edit that was pushed.
    pub local_edit: String,
    /// The content the server reported back.
    pub remote_content: String,
    /// The version the server reported back, if any.
    pub remote_version: Option<u64>,
}

impl Conflict {
    /// Creates a new conflict.
    pub fn new(
        local_edit: impl Into<String>,
        remote_content: impl Into<String>,
        remote_version: Option<u64>,
    ) -> Self {
        Self {
            local_edit: local_edit.into(),
            remote_content: remote_content.into(),
            remote_version,
        }
    }

    /// Returns true if both sides already hold the same text.
    pub fn is_identical(&self) -> bool {
        self.local_edit == self.remote_content
    }
}

/// Resolution for a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep the local edit and push it again against the server's version.
    KeepLocal,
    /// Accept the server's content and abandon the local edit.
    AcceptRemote,
}

impl ConflictResolution {
    /// Returns true if the local edit overrides the server.
    pub fn overrides_remote(&self) -> bool {
        matches!(self, ConflictResolution::KeepLocal)
    }
}

/// Policy for automatic conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Server always wins.
    #[default]
    ServerWins,
    /// Client always wins.
    ClientWins,
}

impl ConflictPolicy {
    /// Resolves a conflict according to this policy.
    pub fn resolve(&self, _conflict: &Conflict) -> ConflictResolution {
        match self {
            ConflictPolicy::ServerWins => ConflictResolution::AcceptRemote,
            ConflictPolicy::ClientWins => ConflictResolution::KeepLocal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_resolution() {
        let conflict = Conflict::new("mine", "theirs", Some(5));

        assert_eq!(
            ConflictPolicy::ServerWins.resolve(&conflict),
            ConflictResolution::AcceptRemote
        );
        assert_eq!(
            ConflictPolicy::ClientWins.resolve(&conflict),
            ConflictResolution::KeepLocal
        );
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::ServerWins);
    }

    #[test]
    fn resolution_override_flag() {
        assert!(ConflictResolution::KeepLocal.overrides_remote());
        assert!(!ConflictResolution::AcceptRemote.overrides_remote());
    }

    #[test]
    fn identical_sides() {
        assert!(Conflict::new("same", "same", None).is_identical());
        assert!(!Conflict::new("a", "b", None).is_identical());
    }
}
