//! Row selection state.
//!
//! Selection tracks rows by [`RowKey`] so it stays stable when filtering or
//! sorting changes which rows are visible and in what order.

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::controlled::{ChangeFn, Controlled};
use crate::key::RowKey;

/// Selection mode for a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed
    #[default]
    None,
    /// At most one row selected
    Single,
    /// Any number of rows selected
    Multiple,
}

/// Set of selected row keys.
pub type KeySet = HashSet<RowKey>;

/// What every reader sees in mode `None`.
static NO_KEYS: LazyLock<KeySet> = LazyLock::new(KeySet::new);

/// Keys added and removed by a selection change.
pub type SelectionDelta = (Vec<RowKey>, Vec<RowKey>);

/// Key-based selection under a [`SelectionMode`].
///
/// In mode `None` every mutator is a no-op and every reader reports an
/// empty selection, even when the caller passes controlled keys. In mode `Single` the set never
/// holds more than one key. Select-all works against the keys the caller
/// passes in, which should be the currently visible (filtered) rows.
#[derive(Debug)]
pub struct SelectionState {
    mode: SelectionMode,
    keys: Controlled<KeySet>,
    /// Anchor for range selection (last toggled key)
    anchor: Option<RowKey>,
}

impl SelectionState {
    /// Create an empty, uncontrolled selection.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            keys: Controlled::uncontrolled(KeySet::new()),
            anchor: None,
        }
    }

    /// Start from default selected keys.
    ///
    /// The defaults are trimmed to fit the mode.
    pub fn with_default_keys(mut self, keys: impl IntoIterator<Item = RowKey>) -> Self {
        let keys = clamp_to_mode(self.mode, keys.into_iter().collect());
        self.keys.reset(keys);
        self
    }

    /// Make the selection caller-owned.
    pub fn with_controlled_keys(mut self, keys: KeySet) -> Self {
        self.keys.set_controlled(Some(keys));
        self
    }

    /// Set the selection change callback.
    pub fn with_on_change(mut self, f: impl FnMut(&KeySet) + 'static) -> Self {
        self.keys.set_on_change(Some(Box::new(f) as ChangeFn<KeySet>));
        self
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Change the mode, trimming internal state to fit it.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        if !self.keys.is_controlled() {
            let trimmed = clamp_to_mode(mode, self.keys.value().clone());
            self.commit(trimmed);
        }
    }

    /// Change the mode without notifying the change callback.
    ///
    /// Internal state is trimmed to fit the mode; controlled keys are left
    /// to the caller.
    pub fn reset_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        let trimmed = clamp_to_mode(mode, self.keys.internal().clone());
        if trimmed != *self.keys.internal() {
            log::debug!("Selection trimmed to fit mode {:?}", mode);
            self.keys.replace_internal(trimmed);
        }
    }

    /// Update the caller-owned keys.
    pub fn set_controlled(&mut self, keys: Option<KeySet>) {
        self.keys.set_controlled(keys);
    }

    /// Currently selected keys.
    pub fn selected_keys(&self) -> &KeySet {
        match self.mode {
            SelectionMode::None => &NO_KEYS,
            _ => self.keys.value(),
        }
    }

    /// Selected keys, sorted for deterministic ordering.
    pub fn selected(&self) -> Vec<RowKey> {
        let mut keys: Vec<_> = self.selected_keys().iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected_keys().contains(key)
    }

    /// Get the anchor key for range selection.
    pub fn anchor(&self) -> Option<&RowKey> {
        self.anchor.as_ref()
    }

    /// Returns `true` if every visible key is selected and there is at
    /// least one visible key.
    pub fn is_all_selected(&self, visible: &[RowKey]) -> bool {
        let keys = self.selected_keys();
        !visible.is_empty() && visible.iter().all(|k| keys.contains(k))
    }

    /// Returns `true` if something is selected but not all visible rows.
    pub fn is_indeterminate(&self, visible: &[RowKey]) -> bool {
        !self.selected_keys().is_empty() && !self.is_all_selected(visible)
    }

    /// Select or deselect one row.
    pub fn on_select_row(&mut self, key: &RowKey, selected: bool) -> SelectionDelta {
        let current = self.keys.value();
        let next = match (self.mode, selected) {
            (SelectionMode::None, _) => return (vec![], vec![]),
            (SelectionMode::Single, true) => KeySet::from([key.clone()]),
            (_, true) => {
                let mut next = current.clone();
                next.insert(key.clone());
                next
            }
            (_, false) => {
                let mut next = current.clone();
                next.remove(key);
                next
            }
        };
        self.anchor = Some(key.clone());
        self.commit(next)
    }

    /// Flip the selection of one row.
    pub fn toggle(&mut self, key: &RowKey) -> SelectionDelta {
        let selected = self.is_selected(key);
        self.on_select_row(key, !selected)
    }

    /// Select every visible row, or clear the selection.
    ///
    /// Only meaningful in `Multiple` mode; a no-op otherwise.
    pub fn on_select_all(&mut self, selected: bool, visible: &[RowKey]) -> SelectionDelta {
        if self.mode != SelectionMode::Multiple {
            return (vec![], vec![]);
        }
        let next = if selected {
            visible.iter().cloned().collect()
        } else {
            KeySet::new()
        };
        self.anchor = None;
        self.commit(next)
    }

    /// Range select from the anchor to `target` (shift-click).
    ///
    /// Requires the ordered list of visible keys to determine the range.
    /// If `extend` is false, selection outside the range is cleared.
    /// Falls back to selecting `target` alone when the anchor is not visible.
    pub fn select_range(&mut self, target: &RowKey, visible: &[RowKey], extend: bool) -> SelectionDelta {
        if self.mode != SelectionMode::Multiple {
            return self.on_select_row(target, true);
        }
        let anchor = self.anchor.clone().unwrap_or_else(|| target.clone());
        let anchor_pos = visible.iter().position(|k| *k == anchor);
        let target_pos = visible.iter().position(|k| k == target);

        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            _ => {
                let mut next = if extend { self.keys.value().clone() } else { KeySet::new() };
                next.insert(target.clone());
                self.anchor = Some(target.clone());
                return self.commit(next);
            }
        };

        let mut next = if extend { self.keys.value().clone() } else { KeySet::new() };
        next.extend(visible[start..=end].iter().cloned());
        // Anchor stays put so consecutive shift-clicks pivot around it.
        self.commit(next)
    }

    /// Clear all selection.
    pub fn clear(&mut self) -> SelectionDelta {
        self.anchor = None;
        self.commit(KeySet::new())
    }

    /// Check if the selection changed since last check.
    pub fn take_dirty(&mut self) -> bool {
        self.keys.take_dirty()
    }

    fn commit(&mut self, next: KeySet) -> SelectionDelta {
        let current = self.keys.value();
        let mut added: Vec<_> = next.difference(current).cloned().collect();
        let mut removed: Vec<_> = current.difference(&next).cloned().collect();
        if added.is_empty() && removed.is_empty() {
            return (added, removed);
        }
        added.sort();
        removed.sort();
        log::trace!("Selection change: +{:?} -{:?}", added, removed);
        self.keys.set(next);
        (added, removed)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(SelectionMode::None)
    }
}

fn clamp_to_mode(mode: SelectionMode, keys: KeySet) -> KeySet {
    match mode {
        SelectionMode::None => KeySet::new(),
        SelectionMode::Single => keys.into_iter().min().into_iter().collect(),
        SelectionMode::Multiple => keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[&str]) -> Vec<RowKey> {
        ids.iter().map(|&k| RowKey::from(k)).collect()
    }

    #[test]
    fn test_none_mode_ignores_mutations() {
        let mut sel = SelectionState::new(SelectionMode::None);
        sel.on_select_row(&"a".into(), true);
        sel.on_select_all(true, &keys(&["a", "b"]));
        assert!(sel.selected_keys().is_empty());
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sel = SelectionState::new(SelectionMode::Single);
        sel.on_select_row(&"a".into(), true);
        let (added, removed) = sel.on_select_row(&"b".into(), true);
        assert_eq!(added, keys(&["b"]));
        assert_eq!(removed, keys(&["a"]));
        assert_eq!(sel.selected(), keys(&["b"]));

        sel.on_select_row(&"b".into(), false);
        assert!(sel.selected_keys().is_empty());
    }

    #[test]
    fn test_single_mode_select_all_is_noop() {
        let mut sel = SelectionState::new(SelectionMode::Single);
        sel.on_select_all(true, &keys(&["a", "b"]));
        assert!(sel.selected_keys().is_empty());
    }

    #[test]
    fn test_multiple_independent_rows() {
        let mut sel = SelectionState::new(SelectionMode::Multiple);
        sel.on_select_row(&"a".into(), true);
        sel.on_select_row(&"b".into(), true);
        sel.on_select_row(&"a".into(), false);
        assert_eq!(sel.selected(), keys(&["b"]));
    }

    #[test]
    fn test_indeterminate() {
        let visible = keys(&["a", "b"]);
        let mut sel = SelectionState::new(SelectionMode::Multiple);
        assert!(!sel.is_indeterminate(&visible));
        sel.on_select_row(&"a".into(), true);
        assert!(sel.is_indeterminate(&visible));
        sel.on_select_row(&"b".into(), true);
        assert!(sel.is_all_selected(&visible));
        assert!(!sel.is_indeterminate(&visible));
    }

    #[test]
    fn test_all_selected_requires_visible_rows() {
        let sel = SelectionState::new(SelectionMode::Multiple);
        assert!(!sel.is_all_selected(&[]));
    }

    #[test]
    fn test_range_select() {
        let visible = keys(&["a", "b", "c", "d", "e"]);
        let mut sel = SelectionState::new(SelectionMode::Multiple);
        sel.toggle(&"b".into());
        sel.select_range(&"d".into(), &visible, false);
        assert_eq!(sel.selected(), keys(&["b", "c", "d"]));

        // Pivot back past the anchor without extending.
        sel.select_range(&"a".into(), &visible, false);
        assert_eq!(sel.selected(), keys(&["a", "b"]));
    }

    #[test]
    fn test_controlled_reports_without_writing() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let reported = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&reported);
        let mut sel = SelectionState::new(SelectionMode::Multiple)
            .with_controlled_keys(KeySet::new())
            .with_on_change(move |k: &KeySet| *sink.borrow_mut() = Some(k.len()));

        sel.on_select_row(&"a".into(), true);
        assert!(sel.selected_keys().is_empty());
        assert_eq!(*reported.borrow(), Some(1));
    }

    #[test]
    fn test_none_mode_hides_controlled_keys() {
        let sel = SelectionState::new(SelectionMode::None).with_controlled_keys(KeySet::from([RowKey::from("1")]));
        let visible = keys(&["1", "2"]);
        assert!(sel.selected_keys().is_empty());
        assert!(sel.selected().is_empty());
        assert!(!sel.is_selected(&"1".into()));
        assert!(!sel.is_all_selected(&keys(&["1"])));
        assert!(!sel.is_indeterminate(&visible));
    }

    #[test]
    fn test_reset_mode_trims_without_callback() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut sel = SelectionState::new(SelectionMode::Multiple)
            .with_default_keys(keys(&["b", "a"]))
            .with_on_change(move |_: &KeySet| counter.set(counter.get() + 1));

        sel.reset_mode(SelectionMode::Single);
        assert_eq!(sel.selected(), keys(&["a"]));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_defaults_clamped_to_single() {
        let sel = SelectionState::new(SelectionMode::Single).with_default_keys(keys(&["b", "a"]));
        assert_eq!(sel.selected(), keys(&["a"]));
    }
}
