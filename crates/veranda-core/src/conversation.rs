//! Single-holder conversation lock.
//!
//! At most one agent converses at any instant. The lock only records who
//! holds it; applying the matching state transitions (previous holder out,
//! new holder in) is the engine's job, so the lock itself never reaches
//! into movement or dialogue state.

use crate::components::AgentId;

/// The sole cross-agent mutual-exclusion invariant, owned by the engine
/// instance rather than living in a process-wide global.
#[derive(Debug, Default)]
pub struct ConversationLock {
    holder: Option<AgentId>,
}

impl ConversationLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self) -> Option<&AgentId> {
        self.holder.as_ref()
    }

    /// Record `id` as the sole holder, returning whoever previously held
    /// the lock.
    pub fn acquire(&mut self, id: AgentId) -> Option<AgentId> {
        self.holder.replace(id)
    }

    /// Clear the lock only if `id` is the current holder. Idempotent and
    /// safe against stale callers.
    pub fn release(&mut self, id: &AgentId) {
        if self.holder.as_ref() == Some(id) {
            self.holder = None;
        }
    }
}
