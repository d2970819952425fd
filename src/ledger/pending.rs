// Pending locks - optimistic entries awaiting ledger confirmation

use crate::ledger::lock::{Lock, LockId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of absorbing a confirmed lock list into the pending set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Pending entries whose id showed up in the confirmed list
    pub confirmed_matched: usize,
    /// Pending entries still waiting for confirmation
    pub still_pending: usize,
}

/// Locks the client has submitted but the confirmed query has not yet
/// returned.
///
/// This is the optimistic-update reconciliation step made explicit: an owned
/// pending list merged with the server-confirmed list by the stable lock id.
/// A pending entry disappears the moment its id appears in the confirmed
/// list; until then it rides along in the merged view. Insertion order is
/// preserved so merged output is stable per call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PendingLocks {
    entries: Vec<Lock>,
}

impl PendingLocks {
    /// Create an empty pending set
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an optimistic entry. Re-pushing an id replaces the earlier
    /// entry in place: the latest local knowledge wins.
    pub fn push(&mut self, lock: Lock) {
        match self.entries.iter_mut().find(|e| e.id() == lock.id()) {
            Some(existing) => *existing = lock,
            None => self.entries.push(lock),
        }
    }

    /// Drop a pending entry by id, returning it if present
    pub fn remove(&mut self, id: LockId) -> Option<Lock> {
        let index = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(index))
    }

    /// Check whether an id is still pending
    pub fn contains(&self, id: LockId) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    /// Number of entries still pending
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over pending entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Lock> {
        self.entries.iter()
    }

    /// Forget all pending entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every pending entry whose id appears in the confirmed list
    pub fn absorb_confirmed(&mut self, confirmed: &[Lock]) -> MergeOutcome {
        let confirmed_ids: HashSet<LockId> = confirmed.iter().map(|l| l.id()).collect();
        let before = self.entries.len();
        self.entries.retain(|e| !confirmed_ids.contains(&e.id()));

        MergeOutcome {
            confirmed_matched: before - self.entries.len(),
            still_pending: self.entries.len(),
        }
    }

    /// Combined view: confirmed entries first (their order preserved), then
    /// the still-pending entries in insertion order. A pending entry whose id
    /// is already confirmed shows up only as the confirmed row.
    pub fn merged_view(&self, confirmed: &[Lock]) -> Vec<Lock> {
        let confirmed_ids: HashSet<LockId> = confirmed.iter().map(|l| l.id()).collect();

        let mut view: Vec<Lock> = confirmed.to_vec();
        view.extend(
            self.entries
                .iter()
                .filter(|e| !confirmed_ids.contains(&e.id()))
                .cloned(),
        );
        view
    }
}
