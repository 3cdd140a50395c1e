//! Conflict decision sources.

use padsync_protocol::{Conflict, ConflictPolicy, ConflictResolution};

/// Decides whether a pushed edit overrides the server after a conflict.
///
/// Called synchronously from the response continuation. A host backed by
/// an interactive prompt suspends the continuation until the user answers.
pub trait ConflictDecisionSource: Send + Sync {
    /// Resolves a conflict.
    fn resolve(&self, conflict: &Conflict) -> ConflictResolution;
}

impl ConflictDecisionSource for ConflictPolicy {
    fn resolve(&self, conflict: &Conflict) -> ConflictResolution {
        ConflictPolicy::resolve(self, conflict)
    }
}

/// A decision source backed by a closure.
///
/// # Example
///
/// ```rust
/// use padsync_engine::{Conflict, ConflictDecisionSource, ConflictResolution, DecisionFn};
///
/// let longest_wins = DecisionFn::new(|c: &Conflict| {
///     if c.local_edit.len() >= c.remote_content.len() {
///         ConflictResolution::KeepLocal
///     } else {
///         ConflictResolution::AcceptRemote
///     }
/// });
/// let conflict = Conflict::new("a longer local edit", "short", Some(2));
/// assert_eq!(longest_wins.resolve(&conflict), ConflictResolution::KeepLocal);
/// ```
pub struct DecisionFn<F> {
    decide: F,
}

impl<F> DecisionFn<F>
where
    F: Fn(&Conflict) -> ConflictResolution + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(decide: F) -> Self {
        Self { decide }
    }
}

impl<F> ConflictDecisionSource for DecisionFn<F>
where
    F: Fn(&Conflict) -> ConflictResolution + Send + Sync,
{
    fn resolve(&self, conflict: &Conflict) -> ConflictResolution {
        (self.decide)(conflict)
    }
}
