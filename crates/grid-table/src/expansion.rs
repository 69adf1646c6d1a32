//! Which rows have their sub-rows shown.

use std::collections::BTreeMap;

use grid_model::RowId;

use crate::tree::{RowTree, next_revision};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpansionState {
    #[default]
    AllExpanded,
    AllCollapsed,
    /// Explicit per-row flags; rows without an entry are collapsed.
    PerRow(BTreeMap<RowId, bool>),
}

#[derive(Debug, Clone)]
pub struct ExpansionStore {
    state: ExpansionState,
    revision: u64,
}

impl Default for ExpansionStore {
    fn default() -> Self {
        Self::new(ExpansionState::default())
    }
}

impl ExpansionStore {
    pub fn new(state: ExpansionState) -> Self {
        Self {
            state,
            revision: next_revision(),
        }
    }

    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_expanded(&self, id: &RowId) -> bool {
        match &self.state {
            ExpansionState::AllExpanded => true,
            ExpansionState::AllCollapsed => false,
            ExpansionState::PerRow(rows) => rows.get(id).copied().unwrap_or(false),
        }
    }

    pub fn is_all_expanded(&self) -> bool {
        matches!(self.state, ExpansionState::AllExpanded)
    }

    /// Flip one row. A global mode is first turned into a per-row map that
    /// reproduces it for every row of `tree`.
    pub fn toggle(&mut self, tree: &RowTree, id: &RowId) -> bool {
        if !tree.contains(id) {
            tracing::debug!("Ignoring expand toggle for unknown row {id}");
            return false;
        }
        let expanded = !self.is_expanded(id);
        let mut rows = match std::mem::take(&mut self.state) {
            ExpansionState::PerRow(rows) => rows,
            ExpansionState::AllExpanded => tree
                .iter_preorder()
                .map(|row| (row.id.clone(), true))
                .collect(),
            ExpansionState::AllCollapsed => BTreeMap::new(),
        };
        rows.insert(id.clone(), expanded);
        self.state = ExpansionState::PerRow(rows);
        self.revision = next_revision();
        true
    }

    pub fn set_all(&mut self, expanded: bool) {
        self.state = if expanded {
            ExpansionState::AllExpanded
        } else {
            ExpansionState::AllCollapsed
        };
        self.revision = next_revision();
    }

    /// Header "expand all" button: a mixed state expands everything.
    pub fn toggle_all(&mut self) {
        let expand = !self.is_all_expanded();
        self.set_all(expand);
    }

    /// Replace the whole state, e.g. from a persisted layout.
    pub fn set_state(&mut self, state: ExpansionState) {
        self.state = state;
        self.revision = next_revision();
    }

    /// Drop per-row entries for rows that are no longer in `tree`.
    pub fn prune(&mut self, tree: &RowTree) -> usize {
        let ExpansionState::PerRow(rows) = &mut self.state else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|id, _| tree.contains(id));
        let pruned = before - rows.len();
        if pruned > 0 {
            self.revision = next_revision();
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{FlatRecord, HierarchyPath};

    fn rid(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn tree() -> RowTree {
        RowTree::from_flat([
            FlatRecord::new(rid("a"), HierarchyPath::from_outline("1").unwrap()),
            FlatRecord::new(rid("b"), HierarchyPath::from_outline("1.1").unwrap()),
            FlatRecord::new(rid("c"), HierarchyPath::from_outline("2").unwrap()),
        ])
        .0
    }

    #[test]
    fn toggle_from_all_expanded_collapses_one_row() {
        let tree = tree();
        let mut store = ExpansionStore::default();
        assert!(store.toggle(&tree, &rid("a")));
        assert!(!store.is_expanded(&rid("a")));
        assert!(store.is_expanded(&rid("b")));
        assert!(store.is_expanded(&rid("c")));
    }

    #[test]
    fn rows_added_after_a_toggle_start_collapsed() {
        let mut tree = tree();
        let mut store = ExpansionStore::default();
        store.toggle(&tree, &rid("c"));
        tree.append(
            Some(&rid("a")),
            rid("d"),
            HierarchyPath::from_outline("1.2").ok(),
            Default::default(),
        )
        .unwrap();
        assert!(store.is_expanded(&rid("b")));
        assert!(!store.is_expanded(&rid("d")));

        store.set_all(true);
        assert!(store.is_expanded(&rid("d")));
    }

    #[test]
    fn toggle_from_all_collapsed_expands_one_row() {
        let tree = tree();
        let mut store = ExpansionStore::new(ExpansionState::AllCollapsed);
        store.toggle(&tree, &rid("a"));
        assert!(store.is_expanded(&rid("a")));
        assert!(!store.is_expanded(&rid("c")));
    }

    #[test]
    fn unknown_row_is_ignored() {
        let tree = tree();
        let mut store = ExpansionStore::default();
        let revision = store.revision();
        assert!(!store.toggle(&tree, &rid("nope")));
        assert_eq!(store.state(), &ExpansionState::AllExpanded);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn toggle_all_cycles() {
        let tree = tree();
        let mut store = ExpansionStore::default();
        store.toggle_all();
        assert_eq!(store.state(), &ExpansionState::AllCollapsed);
        store.toggle_all();
        assert_eq!(store.state(), &ExpansionState::AllExpanded);

        store.toggle(&tree, &rid("a"));
        store.toggle_all();
        assert_eq!(store.state(), &ExpansionState::AllExpanded);
    }

    #[test]
    fn prune_drops_stale_entries() {
        let tree = tree();
        let mut store = ExpansionStore::new(ExpansionState::PerRow(BTreeMap::from([
            (rid("a"), true),
            (rid("gone"), true),
        ])));
        assert_eq!(store.prune(&tree), 1);
        assert_eq!(
            store.state(),
            &ExpansionState::PerRow(BTreeMap::from([(rid("a"), true)]))
        );
    }
}
