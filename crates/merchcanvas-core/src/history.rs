//! Linear undo/redo history of whole-scene snapshots.

use crate::config::MAX_UNDO_HISTORY;
use crate::scene::Scene;
use std::collections::VecDeque;
use std::sync::Arc;

/// Past and future stacks of shared scene snapshots.
///
/// Snapshots are `Arc`s of scenes that are never mutated again, so pushing
/// the current scene costs a reference count, not a copy.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Arc<Scene>>,
    future: Vec<Arc<Scene>>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` undo states.
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation scene and drop the redo branch.
    pub fn record(&mut self, before: Arc<Scene>) {
        self.past.push_back(before);
        self.future.clear();

        // Limit undo history size
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }

    /// Step back: returns the scene to restore, remembering `current` for redo.
    pub fn undo(&mut self, current: Arc<Scene>) -> Option<Arc<Scene>> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward: returns the scene to restore, remembering `current` for undo.
    pub fn redo(&mut self, current: Arc<Scene>) -> Option<Arc<Scene>> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
