//! Linear undo/redo history for guided composition.

use crate::slot::SlotSnapshot;
use serde::{Deserialize, Serialize};

/// A linear undo/redo log of slot-state snapshots with a cursor.
///
/// The stack is seeded with the state it was created from, so the cursor
/// always points at a valid entry. Pushing while the cursor sits before the
/// last entry discards the redo branch, as in any linear history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStack {
    entries: Vec<SlotSnapshot>,
    cursor: usize,
}

impl HistoryStack {
    /// Creates a history seeded with `initial` as its only entry.
    pub fn new(initial: SlotSnapshot) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Records a new snapshot after the cursor, discarding any redo entries.
    pub fn push(&mut self, snapshot: SlotSnapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
    }

    /// Steps the cursor back and returns the snapshot it now points at, or
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&SlotSnapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Steps the cursor forward and returns the snapshot it now points at, or
    /// `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&SlotSnapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot the cursor currently points at.
    pub fn current(&self) -> &SlotSnapshot {
        &self.entries[self.cursor]
    }

    /// Number of recorded entries, including the seed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the stack keeps its seed entry for the cursor invariant.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
