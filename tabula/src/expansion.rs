//! Expanded (detail) row state.

use crate::controlled::{ChangeFn, Controlled};
use crate::key::RowKey;
use crate::selection::KeySet;

/// Keys of rows whose detail view is open.
///
/// Any subset of rows may be expanded at once. Follows the same
/// controlled/uncontrolled rule as selection.
#[derive(Debug, Default)]
pub struct ExpansionState {
    keys: Controlled<KeySet>,
}

impl ExpansionState {
    /// Nothing expanded, uncontrolled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from default expanded keys.
    pub fn with_default_keys(mut self, keys: impl IntoIterator<Item = RowKey>) -> Self {
        self.keys.reset(keys.into_iter().collect());
        self
    }

    /// Make the expanded set caller-owned.
    pub fn with_controlled_keys(mut self, keys: KeySet) -> Self {
        self.keys.set_controlled(Some(keys));
        self
    }

    /// Set the expansion change callback.
    pub fn with_on_change(mut self, f: impl FnMut(&KeySet) + 'static) -> Self {
        self.keys.set_on_change(Some(Box::new(f) as ChangeFn<KeySet>));
        self
    }

    /// Update the caller-owned keys.
    pub fn set_controlled(&mut self, keys: Option<KeySet>) {
        self.keys.set_controlled(keys);
    }

    /// Currently expanded keys.
    pub fn expanded_keys(&self) -> &KeySet {
        self.keys.value()
    }

    pub fn is_expanded(&self, key: &RowKey) -> bool {
        self.keys.value().contains(key)
    }

    /// Expand or collapse one row. Returns `false` when nothing changed.
    pub fn on_expand(&mut self, key: &RowKey, expanded: bool) -> bool {
        if self.is_expanded(key) == expanded {
            return false;
        }
        let mut next = self.keys.value().clone();
        if expanded {
            next.insert(key.clone());
        } else {
            next.remove(key);
        }
        log::trace!("Row '{}' expanded: {}", key, expanded);
        self.keys.set(next);
        true
    }

    /// Flip one row.
    pub fn toggle(&mut self, key: &RowKey) -> bool {
        let expanded = self.is_expanded(key);
        self.on_expand(key, !expanded)
    }

    /// Collapse every row.
    pub fn collapse_all(&mut self) {
        if !self.keys.value().is_empty() {
            self.keys.set(KeySet::new());
        }
    }

    /// Check if the expanded set changed since last check.
    pub fn take_dirty(&mut self) -> bool {
        self.keys.take_dirty()
    }
}
