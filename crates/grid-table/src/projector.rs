//! Flattening the row tree into the rows currently on screen.

use std::cmp::Ordering;

use grid_model::{Row, RowId, SortDirection};

use crate::columns::SortKey;
use crate::expansion::ExpansionStore;
use crate::tree::RowTree;

/// Rows reachable from a root through expanded rows only, in pre-order.
pub fn project<'a>(tree: &'a RowTree, expansion: &ExpansionStore) -> Vec<&'a Row> {
    project_sorted(tree, expansion, None)
}

/// Like [`project`], with siblings ordered by `sort` when one is active.
///
/// The sort is stable and keeps missing values last in both directions.
pub fn project_sorted<'a>(
    tree: &'a RowTree,
    expansion: &ExpansionStore,
    sort: Option<&SortKey>,
) -> Vec<&'a Row> {
    let sort = sort.filter(|key| key.direction != SortDirection::None);
    let mut out = Vec::new();
    walk(tree, tree.roots(), expansion, sort, &mut out);
    out
}

fn walk<'a>(
    tree: &'a RowTree,
    ids: &'a [RowId],
    expansion: &ExpansionStore,
    sort: Option<&SortKey>,
    out: &mut Vec<&'a Row>,
) {
    let mut siblings: Vec<&Row> = ids.iter().filter_map(|id| tree.get(id)).collect();
    if let Some(key) = sort {
        siblings.sort_by(|a, b| compare(a, b, key));
    }
    for row in siblings {
        out.push(row);
        if row.has_children() && expansion.is_expanded(&row.id) {
            walk(tree, &row.children, expansion, sort, out);
        }
    }
}

fn compare(a: &Row, b: &Row, key: &SortKey) -> Ordering {
    let (a, b) = (a.value(&key.field), b.value(&key.field));
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if key.direction == SortDirection::Descending => b.sort_cmp(a),
        (false, false) => a.sort_cmp(b),
    }
}

type MemoKey = (u64, u64, Option<SortKey>);

/// Caches the projected identifiers until the tree, the expansion or the
/// sort changes.
#[derive(Debug, Default)]
pub struct Projector {
    key: Option<MemoKey>,
    ids: Vec<RowId>,
    recomputations: u64,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute if any input changed. Returns whether it did.
    pub fn refresh(
        &mut self,
        tree: &RowTree,
        expansion: &ExpansionStore,
        sort: Option<&SortKey>,
    ) -> bool {
        let key = (tree.revision(), expansion.revision(), sort.cloned());
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.ids = project_sorted(tree, expansion, sort)
            .into_iter()
            .map(|row| row.id.clone())
            .collect();
        self.key = Some(key);
        self.recomputations += 1;
        true
    }

    /// Identifiers from the last refresh.
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    pub fn visible_ids(
        &mut self,
        tree: &RowTree,
        expansion: &ExpansionStore,
        sort: Option<&SortKey>,
    ) -> &[RowId] {
        self.refresh(tree, expansion, sort);
        &self.ids
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
