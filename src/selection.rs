use serde::{Deserialize, Serialize};

use crate::shape::ShapeId;

/// Selected shapes plus the single hovered shape.
///
/// Hover and selection are independent: the hovered shape need not be selected.
/// The selected set keeps insertion order so operations over a snapshot are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    hovered: Option<ShapeId>,
    selected: Vec<ShapeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    pub fn hover(&mut self, id: ShapeId) {
        self.hovered = Some(id);
    }

    pub fn dehover(&mut self) {
        self.hovered = None;
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn select(&mut self, id: ShapeId) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        for id in ids {
            self.select(id);
        }
    }

    pub fn deselect(&mut self, id: ShapeId) {
        self.selected.retain(|s| *s != id);
    }

    pub fn deselect_all(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        for id in ids {
            self.deselect(id);
        }
    }

    /// Select if not selected, otherwise deselect.
    pub fn toggle(&mut self, id: ShapeId) {
        if self.is_selected(id) {
            self.deselect(id);
        } else {
            self.select(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[ShapeId] {
        &self.selected
    }

    /// Copy of the selected set, for operations that mutate the selection
    /// while walking it.
    pub fn snapshot(&self) -> Vec<ShapeId> {
        self.selected.clone()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The only selected shape, if exactly one is selected.
    pub fn single(&self) -> Option<ShapeId> {
        match self.selected.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_is_independent_of_selection() {
        let mut state = SelectionState::new();
        let a = ShapeId::new();
        let b = ShapeId::new();
        state.select(a);
        state.hover(b);
        assert!(!state.is_selected(b));
        assert_eq!(state.hovered(), Some(b));
        state.clear();
        assert_eq!(state.hovered(), Some(b));
    }

    #[test]
    fn test_toggle_and_single() {
        let mut state = SelectionState::new();
        let a = ShapeId::new();
        state.toggle(a);
        assert_eq!(state.single(), Some(a));
        state.toggle(a);
        assert!(state.is_empty());
    }
}
