//! Scripted conflict decision sources.

use padsync_engine::{Conflict, ConflictDecisionSource, ConflictResolution};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct Script {
    answers: VecDeque<ConflictResolution>,
    seen: Vec<Conflict>,
}

/// A decision source that answers from a queue and records every conflict.
///
/// Once the queue is exhausted it accepts the remote content. Clones share
/// the same queue, so a test can keep a handle after installing it.
#[derive(Clone, Default)]
pub struct ScriptedDecisions {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDecisions {
    /// Creates a source that answers with `answers` in order.
    pub fn new(answers: impl IntoIterator<Item = ConflictResolution>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                answers: answers.into_iter().collect(),
                seen: Vec::new(),
            })),
        }
    }

    /// Creates a source that keeps the local edit `n` times.
    pub fn keep_local(n: usize) -> Self {
        Self::new(std::iter::repeat(ConflictResolution::KeepLocal).take(n))
    }

    /// Returns the conflicts seen so far.
    pub fn seen(&self) -> Vec<Conflict> {
        self.script.lock().seen.clone()
    }

    /// Returns the number of unanswered decisions left in the queue.
    pub fn remaining(&self) -> usize {
        self.script.lock().answers.len()
    }
}

impl ConflictDecisionSource for ScriptedDecisions {
    fn resolve(&self, conflict: &Conflict) -> ConflictResolution {
        let mut script = self.script.lock();
        script.seen.push(conflict.clone());
        script
            .answers
            .pop_front()
            .unwrap_or(ConflictResolution::AcceptRemote)
    }
}
