use log::debug;

use crate::document::Document;
use crate::error::{EditorError, EditorResult};

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Snapshot based undo/redo for a document.
///
/// Every entry is the whole document as it was before (undo) or after (redo)
/// a change. Shapes keep their ids across snapshots, so a restored document
/// is still consistent with ids held by the host.
#[derive(Debug, Clone)]
pub struct History {
    /// Documents to go back to, oldest first
    undo_stack: Vec<Document>,
    /// Documents undone, most recently undone last
    redo_stack: Vec<Document>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Creates a new empty history keeping at most `limit` undo steps
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state a change started from. Clears the redo stack.
    pub fn record(&mut self, before: Document) {
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Swap `current` with the last recorded state.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EmptyHistory`] when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Document) -> EditorResult<()> {
        let previous = self.undo_stack.pop().ok_or(EditorError::EmptyHistory("undo"))?;
        self.redo_stack.push(std::mem::replace(current, previous));
        debug!("undo ({} left)", self.undo_stack.len());
        Ok(())
    }

    /// Swap `current` with the last undone state.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EmptyHistory`] when there is nothing to redo.
    pub fn redo(&mut self, current: &mut Document) -> EditorResult<()> {
        let next = self.redo_stack.pop().ok_or(EditorError::EmptyHistory("redo"))?;
        self.undo_stack.push(std::mem::replace(current, next));
        debug!("redo ({} left)", self.redo_stack.len());
        Ok(())
    }

    /// Returns true if there are changes that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are changes that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
