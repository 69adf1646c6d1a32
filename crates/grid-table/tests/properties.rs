//! Invariants of projection, column ordering and selection.

use std::collections::BTreeSet;

use grid_model::{ColumnDescriptor, ColumnId, FlatRecord, HierarchyPath, RowId};
use grid_table::{ColumnLayout, ExpansionState, ExpansionStore, RowTree, SelectionStore, project};
use proptest::prelude::*;

fn rid(s: &str) -> RowId {
    RowId::new(s).unwrap()
}

/// A random forest: each new row hangs under an earlier row or starts a root.
fn arb_tree() -> impl Strategy<Value = RowTree> {
    prop::collection::vec(any::<Option<prop::sample::Index>>(), 1..40).prop_map(|parents| {
        let mut paths: Vec<HierarchyPath> = Vec::new();
        let mut child_counts: Vec<u32> = Vec::new();
        let mut root_count = 0u32;
        let mut records = Vec::new();
        for (n, parent) in parents.into_iter().enumerate() {
            let path = match parent {
                Some(index) if !paths.is_empty() => {
                    let p = index.index(paths.len());
                    child_counts[p] += 1;
                    let parent_path = &paths[p];
                    parent_path.child(format!("{}.{}", parent_path.dotted(), child_counts[p]))
                }
                _ => {
                    root_count += 1;
                    HierarchyPath::root(root_count.to_string())
                }
            };
            records.push(FlatRecord::new(rid(&format!("r{n}")), path.clone()));
            paths.push(path);
            child_counts.push(0);
        }
        RowTree::from_flat(records).0
    })
}

fn reachable(tree: &RowTree, expansion: &ExpansionStore) -> Vec<RowId> {
    let mut out = Vec::new();
    let mut stack: Vec<&RowId> = tree.roots().iter().rev().collect();
    while let Some(id) = stack.pop() {
        out.push(id.clone());
        if expansion.is_expanded(id) {
            stack.extend(tree.children(id).iter().rev());
        }
    }
    out
}

fn hidden_by_collapsed_ancestor(tree: &RowTree, expansion: &ExpansionStore, id: &RowId) -> bool {
    let mut current = tree.get(id).and_then(|row| row.parent.clone());
    while let Some(parent) = current {
        if !expansion.is_expanded(&parent) {
            return true;
        }
        current = tree.get(&parent).and_then(|row| row.parent.clone());
    }
    false
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn projection_is_reachable_preorder(
        tree in arb_tree(),
        toggles in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let ids = tree.ids();
        let mut expansion = ExpansionStore::default();
        for index in toggles {
            expansion.toggle(&tree, index.get(&ids));
        }

        let projected: Vec<RowId> = project(&tree, &expansion)
            .into_iter()
            .map(|row| row.id.clone())
            .collect();
        prop_assert_eq!(&projected, &reachable(&tree, &expansion));
        for id in &projected {
            prop_assert!(!hidden_by_collapsed_ancestor(&tree, &expansion, id));
        }
    }

    #[test]
    fn collapsed_projection_is_roots(tree in arb_tree()) {
        let expansion = ExpansionStore::new(ExpansionState::AllCollapsed);
        let projected: Vec<RowId> = project(&tree, &expansion)
            .into_iter()
            .map(|row| row.id.clone())
            .collect();
        prop_assert_eq!(projected, tree.roots().to_vec());
    }

    #[test]
    fn column_order_stays_a_permutation(
        moves in prop::collection::vec((0usize..8, 0usize..10), 0..30),
    ) {
        let ids: Vec<ColumnId> = (0..8).map(|n| ColumnId::new(format!("c{n}")).unwrap()).collect();
        let mut layout = ColumnLayout::new(ids.iter().map(|id| ColumnDescriptor::new(id.clone(), id.as_str())));
        for (moved, target) in moves {
            // Targets past the end name unknown columns.
            let target = ColumnId::new(format!("c{target}")).unwrap();
            layout.reorder(&ids[moved], &target);
        }
        let order = layout.order();
        prop_assert_eq!(order.len(), ids.len());
        let unique: BTreeSet<&ColumnId> = order.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn adjacent_swap_round_trips(position in 0usize..5) {
        let ids: Vec<ColumnId> = (0..6).map(|n| ColumnId::new(format!("c{n}")).unwrap()).collect();
        let mut layout = ColumnLayout::new(ids.iter().map(|id| ColumnDescriptor::new(id.clone(), id.as_str())));
        let (a, b) = (ids[position].clone(), ids[position + 1].clone());
        layout.reorder(&a, &b);
        layout.reorder(&b, &a);
        prop_assert_eq!(layout.order(), ids.as_slice());
    }

    #[test]
    fn pruned_selection_is_subset_of_tree(
        tree in arb_tree(),
        extra in prop::collection::btree_set("[a-z]{3}", 0..5),
    ) {
        let mut selection = SelectionStore::new();
        for id in tree.ids().iter().step_by(2) {
            selection.set_row(id, true);
        }
        for id in &extra {
            selection.set_row(&rid(id), true);
        }
        selection.prune(&tree);
        for id in selection.selected_ids() {
            prop_assert!(tree.contains(id));
        }
    }
}
