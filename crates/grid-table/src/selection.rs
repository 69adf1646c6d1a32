//! Selected rows.
//!
//! Selecting a parent never selects its sub-rows and selecting every sub-row
//! never selects the parent.

use std::collections::{BTreeMap, BTreeSet};

use grid_model::RowId;

use crate::tree::RowTree;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    selected: BTreeSet<RowId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row; returns its new state.
    pub fn toggle_row(&mut self, id: &RowId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Returns whether anything changed.
    pub fn set_row(&mut self, id: &RowId, selected: bool) -> bool {
        if selected {
            self.selected.insert(id.clone())
        } else {
            self.selected.remove(id)
        }
    }

    /// Header checkbox: clears `ids` when all are selected, selects them all
    /// otherwise.
    pub fn toggle_all(&mut self, ids: &[RowId]) {
        if self.is_all_selected(ids) {
            for id in ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids.iter().cloned());
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> &BTreeSet<RowId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_all_selected(&self, ids: &[RowId]) -> bool {
        !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id))
    }

    /// Some but not all of `ids` selected: the indeterminate checkbox.
    pub fn is_some_selected(&self, ids: &[RowId]) -> bool {
        ids.iter().any(|id| self.selected.contains(id)) && !self.is_all_selected(ids)
    }

    /// Selected rows of one kind, e.g. `phase_`.
    pub fn selected_with_prefix(&self, prefix: &str) -> Vec<&RowId> {
        self.selected
            .iter()
            .filter(|id| id.as_str().starts_with(prefix))
            .collect()
    }

    /// Drop ids that are not in `tree`. Returns the dropped ids.
    pub fn prune(&mut self, tree: &RowTree) -> Vec<RowId> {
        let stale: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| !tree.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            self.selected.remove(id);
        }
        if !stale.is_empty() {
            tracing::debug!("Pruned {} stale selections", stale.len());
        }
        stale
    }

    /// Restore from a persisted `rowSelection` map, keeping only rows in `tree`.
    pub fn restore(&mut self, rows: &BTreeMap<RowId, bool>, tree: &RowTree) {
        self.selected = rows
            .iter()
            .filter(|(id, selected)| **selected && tree.contains(id))
            .map(|(id, _)| id.clone())
            .collect();
    }

    pub fn to_map(&self) -> BTreeMap<RowId, bool> {
        self.selected.iter().map(|id| (id.clone(), true)).collect()
    }
}
