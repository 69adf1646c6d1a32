//! Row tree built from flat (hierarchy path) or nested input.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use grid_model::{Fields, FlatRecord, HierarchyPath, NestedRecord, Row, RowId};

use crate::error::{Result, TableError};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Process-wide revision source so memo keys never repeat across reloads.
pub(crate) fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Structural problems found while building a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records whose parent path matched no record; they were made roots.
    pub orphans: Vec<RowId>,
    /// Records skipped because their identifier was already taken.
    pub duplicates: Vec<RowId>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.duplicates.is_empty()
    }
}

/// Addressable tree of rows.
///
/// Rows reference parents and children by identifier. Root order and child
/// order are the display order before any sort is applied.
#[derive(Debug, Clone)]
pub struct RowTree {
    rows: BTreeMap<RowId, Row>,
    roots: Vec<RowId>,
    revision: u64,
}

impl Default for RowTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RowTree {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            roots: Vec::new(),
            revision: next_revision(),
        }
    }

    /// Build from records that carry their hierarchy path.
    ///
    /// Records are ordered by path first, so a parent always precedes its
    /// children regardless of input order.
    pub fn from_flat(records: impl IntoIterator<Item = FlatRecord>) -> (Self, BuildReport) {
        let mut records: Vec<FlatRecord> = records.into_iter().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));

        let mut tree = Self::new();
        let mut report = BuildReport::default();
        let mut by_path: HashMap<HierarchyPath, RowId> = HashMap::new();

        for record in records {
            if tree.rows.contains_key(&record.id) {
                tracing::warn!("Skipping duplicate row id {}", record.id);
                report.duplicates.push(record.id);
                continue;
            }

            let parent = match record.path.parent() {
                Some(parent_path) => match by_path.get(&parent_path) {
                    Some(parent) => Some(parent.clone()),
                    None => {
                        tracing::warn!(
                            "Row {} has no parent at {}, treating it as a root",
                            record.id,
                            parent_path
                        );
                        report.orphans.push(record.id.clone());
                        None
                    }
                },
                None => None,
            };

            by_path
                .entry(record.path.clone())
                .or_insert_with(|| record.id.clone());
            tree.insert(parent.as_ref(), record.id, Some(record.path), record.fields);
        }

        tracing::debug!(
            rows = tree.len(),
            orphans = report.orphans.len(),
            "Built row tree from flat records"
        );
        (tree, report)
    }

    /// Build from records that carry their children inline. Source order is kept.
    pub fn from_nested(records: impl IntoIterator<Item = NestedRecord>) -> (Self, BuildReport) {
        let mut tree = Self::new();
        let mut report = BuildReport::default();
        for record in records {
            tree.insert_nested(None, record, &mut report);
        }
        tracing::debug!(rows = tree.len(), "Built row tree from nested records");
        (tree, report)
    }

    fn insert_nested(
        &mut self,
        parent: Option<&RowId>,
        record: NestedRecord,
        report: &mut BuildReport,
    ) {
        if self.rows.contains_key(&record.id) {
            tracing::warn!("Skipping duplicate row id {} and its sub-rows", record.id);
            report.duplicates.push(record.id);
            return;
        }
        let id = record.id.clone();
        self.insert(parent, record.id, None, record.fields);
        for child in record.children {
            self.insert_nested(Some(&id), child, report);
        }
    }

    /// Link a row that is known not to exist yet.
    fn insert(
        &mut self,
        parent: Option<&RowId>,
        id: RowId,
        path: Option<HierarchyPath>,
        fields: Fields,
    ) {
        let depth = match parent.and_then(|p| self.rows.get_mut(p)) {
            Some(parent_row) => {
                parent_row.children.push(id.clone());
                parent_row.depth + 1
            }
            None => {
                self.roots.push(id.clone());
                0
            }
        };
        let row = Row {
            id: id.clone(),
            depth,
            parent: parent.filter(|_| depth > 0).cloned(),
            children: Vec::new(),
            path,
            fields,
        };
        self.rows.insert(id, row);
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    /// Children of `id` in display order; empty for leaves and unknown ids.
    pub fn children(&self, id: &RowId) -> &[RowId] {
        self.rows
            .get(id)
            .map(|row| row.children.as_slice())
            .unwrap_or_default()
    }

    pub fn iter_preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// All identifiers in pre-order.
    pub fn ids(&self) -> Vec<RowId> {
        self.iter_preorder().map(|row| row.id.clone()).collect()
    }

    /// Rows below `id` in pre-order, excluding `id` itself.
    ///
    /// Besides linked children this includes any row whose hierarchy path
    /// extends the path of `id`, so orphans promoted to roots still belong to
    /// the subtree their outline number names.
    pub fn descendants(&self, id: &RowId) -> Vec<RowId> {
        let Some(target) = self.rows.get(id) else {
            return Vec::new();
        };
        let mut members: BTreeSet<&RowId> = BTreeSet::new();
        members.insert(&target.id);
        let mut out = Vec::new();
        for row in self.iter_preorder() {
            if row.id == target.id {
                continue;
            }
            let linked = row.parent.as_ref().is_some_and(|p| members.contains(p));
            let by_path = match (&target.path, &row.path) {
                (Some(prefix), Some(path)) => prefix != path && prefix.is_prefix_of(path),
                _ => false,
            };
            if linked || by_path {
                members.insert(&row.id);
                out.push(row.id.clone());
            }
        }
        out
    }

    /// Add a row under `parent`, or as the last root when `parent` is `None`.
    pub fn append(
        &mut self,
        parent: Option<&RowId>,
        id: RowId,
        path: Option<HierarchyPath>,
        fields: Fields,
    ) -> Result<()> {
        if self.rows.contains_key(&id) {
            return Err(TableError::DuplicateRow(id));
        }
        if let Some(parent) = parent
            && !self.rows.contains_key(parent)
        {
            return Err(TableError::UnknownRow(parent.clone()));
        }
        self.insert(parent, id, path, fields);
        self.revision = next_revision();
        Ok(())
    }

    /// Overwrite the field values of a row, keeping its place in the tree.
    pub fn replace_fields(&mut self, id: &RowId, fields: Fields) -> Result<()> {
        let row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| TableError::UnknownRow(id.clone()))?;
        row.fields = fields;
        self.revision = next_revision();
        Ok(())
    }

    /// Remove `id` and its descendants. Returns the removed identifiers,
    /// empty when `id` is unknown.
    pub fn remove_subtree(&mut self, id: &RowId) -> Vec<RowId> {
        let Some(parent) = self.rows.get(id).map(|row| row.parent.clone()) else {
            tracing::debug!("Ignoring removal of unknown row {id}");
            return Vec::new();
        };

        let mut removed = vec![id.clone()];
        removed.extend(self.descendants(id));
        for gone in &removed {
            self.rows.remove(gone);
        }

        let gone: BTreeSet<&RowId> = removed.iter().collect();
        match parent.and_then(|p| self.rows.get_mut(&p)) {
            Some(parent_row) => parent_row.children.retain(|c| c != id),
            None => self.roots.retain(|r| r != id),
        }
        self.roots.retain(|r| !gone.contains(r));

        self.revision = next_revision();
        tracing::debug!("Removed {} rows under {id}", removed.len());
        removed
    }
}

/// Depth-first pre-order traversal over every row of a tree.
pub struct PreOrder<'a> {
    tree: &'a RowTree,
    stack: Vec<&'a RowId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(row) = self.tree.rows.get(id) {
                self.stack.extend(row.children.iter().rev());
                return Some(row);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn flat(id: &str, outline: &str) -> FlatRecord {
        FlatRecord::new(rid(id), HierarchyPath::from_outline(outline).unwrap())
    }

    #[test]
    fn flat_input_order_does_not_matter() {
        let (tree, report) = RowTree::from_flat([
            flat("c", "1.1.1"),
            flat("d", "1.2"),
            flat("a", "1"),
            flat("b", "1.1"),
        ]);
        assert!(report.is_clean());
        let ids: Vec<String> = tree.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        assert_eq!(tree.get(&rid("c")).unwrap().depth, 2);
        assert_eq!(tree.get(&rid("c")).unwrap().parent, Some(rid("b")));
    }

    #[test]
    fn numeric_outline_order() {
        let (tree, _) = RowTree::from_flat([flat("ten", "10"), flat("two", "2"), flat("one", "1")]);
        let ids: Vec<String> = tree.roots().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["one", "two", "ten"]);
    }

    #[test]
    fn orphans_become_roots() {
        let (tree, report) = RowTree::from_flat([flat("a", "1"), flat("lost", "2.1")]);
        assert_eq!(report.orphans, vec![rid("lost")]);
        let lost = tree.get(&rid("lost")).unwrap();
        assert!(lost.is_root());
        assert_eq!(lost.depth, 0);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn duplicates_are_skipped() {
        let (tree, report) = RowTree::from_flat([flat("a", "1"), flat("a", "2")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(report.duplicates, vec![rid("a")]);
    }

    #[test]
    fn nested_keeps_source_order() {
        let data = NestedRecord::new(rid("phase_1"))
            .with_child(NestedRecord::new(rid("stage_2")))
            .with_child(
                NestedRecord::new(rid("stage_1")).with_child(NestedRecord::new(rid("task_1"))),
            );
        let (tree, report) = RowTree::from_nested([data]);
        assert!(report.is_clean());
        let ids: Vec<String> = tree.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["phase_1", "stage_2", "stage_1", "task_1"]);
        assert_eq!(tree.get(&rid("task_1")).unwrap().depth, 2);
        assert!(tree.get(&rid("task_1")).unwrap().path.is_none());
    }

    #[test]
    fn append_rejects_duplicates_and_unknown_parents() {
        let (mut tree, _) = RowTree::from_flat([flat("a", "1")]);
        let before = tree.revision();
        assert_eq!(
            tree.append(None, rid("a"), None, Fields::new()),
            Err(TableError::DuplicateRow(rid("a")))
        );
        assert_eq!(
            tree.append(Some(&rid("zz")), rid("b"), None, Fields::new()),
            Err(TableError::UnknownRow(rid("zz")))
        );
        assert_eq!(tree.revision(), before);

        tree.append(Some(&rid("a")), rid("b"), None, Fields::new())
            .unwrap();
        assert!(tree.revision() > before);
        assert_eq!(tree.children(&rid("a")), &[rid("b")]);
    }

    #[test]
    fn remove_cascades_by_link_and_path() {
        let (mut tree, report) = RowTree::from_flat([
            flat("a", "1"),
            flat("b", "1.1"),
            flat("c", "1.1.1"),
            flat("orphan", "1.9.1"),
            flat("d", "2"),
        ]);
        assert_eq!(report.orphans, vec![rid("orphan")]);

        let removed = tree.remove_subtree(&rid("a"));
        assert_eq!(removed, vec![rid("a"), rid("b"), rid("c"), rid("orphan")]);
        assert_eq!(tree.ids(), vec![rid("d")]);
        assert!(tree.remove_subtree(&rid("a")).is_empty());
    }

    #[test]
    fn path_prefix_is_segment_based() {
        let (mut tree, _) = RowTree::from_flat([flat("one", "1"), flat("ten", "10")]);
        tree.remove_subtree(&rid("one"));
        assert!(tree.contains(&rid("ten")));
    }
}
