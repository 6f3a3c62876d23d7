//! Undo/redo over full configuration snapshots.
//!
//! The controller keeps two LIFO stacks of snapshots. Callers checkpoint the
//! live configuration before every mutating operation; a checkpoint clears
//! the redo stack (divergent-history discipline: once a new edit happens,
//! the redone future is gone). Undo and redo swap the live configuration with
//! a stack top, carry the listener list over to whatever is live afterwards
//! and fire a full-change notification, since the restored state may differ
//! arbitrarily from what listeners last saw.
//!
//! All calls happen on the single model thread, like every other mutation.

use crate::config::Configuration;

#[derive(Debug)]
pub struct History {
    capacity: usize,
    undo: Vec<Configuration>,
    redo: Vec<Configuration>,
}

impl History {
    /// `capacity` bounds the undo stack; the oldest snapshot is dropped when
    /// a checkpoint would exceed it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Snapshots the current state onto the undo stack. Call before applying
    /// a mutating operation.
    pub fn checkpoint(&mut self, current: &Configuration) {
        if self.undo.len() == self.capacity {
            self.undo.remove(0);
        }
        self.undo.push(current.clone());
        self.redo.clear();
        tracing::trace!(depth = self.undo.len(), "history checkpoint");
    }

    /// Restores the most recent snapshot, pushing the current state onto the
    /// redo stack. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, live: &mut Configuration) -> bool {
        let Some(mut restored) = self.undo.pop() else {
            return false;
        };
        restored.listeners = std::mem::take(&mut live.listeners);
        self.redo.push(std::mem::replace(live, restored));
        live.notify_full();
        true
    }

    /// Re-applies the most recently undone state. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self, live: &mut Configuration) -> bool {
        let Some(mut restored) = self.redo.pop() else {
            return false;
        };
        restored.listeners = std::mem::take(&mut live.listeners);
        self.undo.push(std::mem::replace(live, restored));
        live.notify_full();
        true
    }
}
