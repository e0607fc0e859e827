//! Multi-select set with select-all / indeterminate semantics.

use std::collections::HashSet;

/// What the header checkbox of a list screen should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    /// Every visible row is selected (false when nothing is visible).
    pub checked: bool,
    /// Some but not all visible rows are selected.
    pub indeterminate: bool,
}

/// Selection of record ids.
///
/// Invariant: the selection only ever refers to ids currently visible on
/// screen. The owning engine clears it unconditionally whenever the visible
/// set changes; stale selections are never carried forward.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: HashSet<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// `checked=true` selects exactly the given visible ids; `false` empties
    /// the selection.
    pub fn select_all<'a>(&mut self, checked: bool, visible: impl IntoIterator<Item = &'a str>) {
        self.selected.clear();
        if checked {
            self.selected
                .extend(visible.into_iter().map(|id| id.to_string()));
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn header_state<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> HeaderState {
        let mut total = 0usize;
        let mut selected = 0usize;
        for id in visible {
            total += 1;
            if self.selected.contains(id) {
                selected += 1;
            }
        }
        HeaderState {
            checked: total > 0 && selected == total,
            indeterminate: selected > 0 && selected < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VISIBLE: [&str; 3] = ["a", "b", "c"];

    #[test]
    fn toggle_adds_and_removes() {
        let mut sel = SelectionManager::new();
        sel.toggle("a");
        assert!(sel.is_selected("a"));
        sel.toggle("a");
        assert!(!sel.is_selected("a"));
    }

    #[test]
    fn select_all_true_selects_every_visible_id() {
        let mut sel = SelectionManager::new();
        sel.select_all(true, VISIBLE);
        assert_eq!(sel.len(), 3);
        let state = sel.header_state(VISIBLE);
        assert!(state.checked);
        assert!(!state.indeterminate);
    }

    #[test]
    fn select_all_false_empties_the_selection() {
        let mut sel = SelectionManager::new();
        sel.select_all(true, VISIBLE);
        sel.select_all(false, VISIBLE);
        assert!(sel.is_empty());
        let state = sel.header_state(VISIBLE);
        assert!(!state.checked);
        assert!(!state.indeterminate);
    }

    #[test]
    fn partial_selection_is_indeterminate() {
        let mut sel = SelectionManager::new();
        sel.select_all(true, VISIBLE);
        sel.toggle("b");
        let state = sel.header_state(VISIBLE);
        assert!(!state.checked);
        assert!(state.indeterminate);
    }

    #[test]
    fn empty_visible_set_is_neither_checked_nor_indeterminate() {
        let sel = SelectionManager::new();
        let state = sel.header_state([]);
        assert!(!state.checked);
        assert!(!state.indeterminate);
    }
}
