//! Adding, editing, duplicating and deleting rows.
//!
//! New rows get WBS numbers one past the highest sibling number, so
//! numbers freed by deletes are not reused within a parent.

use grid_model::{CellValue, Fields, HierarchyPath, RowId};
use uuid::Uuid;

use crate::dialog::DialogOutcome;
use crate::error::{Result, TableError};
use crate::tree::RowTree;

/// Field that holds a row's outline number for display.
pub const WBS_FIELD: &str = "wbs";

/// Proof that the user confirmed deleting one specific row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    row: RowId,
}

impl DeleteConfirmation {
    pub fn row(&self) -> &RowId {
        &self.row
    }
}

/// Ask to delete `id`. `None` when the row does not exist.
pub fn confirm_delete(tree: &RowTree, id: &RowId) -> Option<DeleteConfirmation> {
    tree.contains(id).then(|| DeleteConfirmation { row: id.clone() })
}

/// Hierarchy path for a new child of `parent`, or for a new top-level row
/// when `parent` is `None` or unknown.
///
/// `None` when the tree has no paths to extend: the parent is unnumbered, or
/// no existing root carries a path.
pub fn next_child_path(tree: &RowTree, parent: Option<&RowId>) -> Option<HierarchyPath> {
    let parent_row = parent.and_then(|id| {
        let row = tree.get(id);
        if row.is_none() {
            tracing::debug!("Unknown parent {id}, numbering at the top level");
        }
        row
    });

    match parent_row {
        Some(row) => {
            let path = row.path.as_ref()?;
            let next = max_index(tree, &row.children) + 1;
            Some(path.child(format!("{}.{next}", path.dotted())))
        }
        None => {
            let roots = tree.roots();
            let numbered = roots.is_empty()
                || roots
                    .iter()
                    .any(|id| tree.get(id).is_some_and(|r| r.path.is_some()));
            numbered.then(|| HierarchyPath::root((max_index(tree, roots) + 1).to_string()))
        }
    }
}

fn max_index(tree: &RowTree, siblings: &[RowId]) -> u64 {
    siblings
        .iter()
        .filter_map(|id| tree.get(id))
        .filter_map(|row| row.path.as_ref().and_then(HierarchyPath::last_index))
        .max()
        .unwrap_or(0)
}

/// Fresh identifier, prefixed with the row kind when one is given.
pub fn new_row_id(kind: Option<&str>) -> Result<RowId> {
    let uuid = Uuid::new_v4();
    let id = match kind.map(str::trim).filter(|k| !k.is_empty()) {
        Some(kind) => RowId::new(format!("{kind}_{uuid}"))?,
        None => RowId::new(uuid.to_string())?,
    };
    Ok(id)
}

/// Apply a submitted dialog. Returns the id of the added or edited row.
pub fn apply_outcome(tree: &mut RowTree, outcome: DialogOutcome) -> Result<RowId> {
    match outcome {
        DialogOutcome::Append {
            parent,
            kind,
            fields,
        } => {
            let parent = parent.filter(|p| tree.contains(p));
            append_numbered(tree, parent.as_ref(), kind.as_deref(), fields)
        }
        DialogOutcome::Replace { row, mut fields } => {
            let current = tree
                .get(&row)
                .ok_or_else(|| TableError::UnknownRow(row.clone()))?;
            if let Some(path) = &current.path {
                fields.insert(WBS_FIELD.to_string(), CellValue::text(path.dotted()));
            }
            tree.replace_fields(&row, fields)?;
            tracing::info!("Edited row {row}");
            Ok(row)
        }
    }
}

/// Copy a row's values into a new sibling. Sub-rows are not copied.
pub fn duplicate_row(tree: &mut RowTree, id: &RowId) -> Result<RowId> {
    let source = tree
        .get(id)
        .ok_or_else(|| TableError::UnknownRow(id.clone()))?;
    let parent = source.parent.clone();
    let fields = source.fields.clone();
    let kind = id.kind_prefix().map(str::to_string);
    append_numbered(tree, parent.as_ref(), kind.as_deref(), fields)
}

fn append_numbered(
    tree: &mut RowTree,
    parent: Option<&RowId>,
    kind: Option<&str>,
    mut fields: Fields,
) -> Result<RowId> {
    let id = new_row_id(kind)?;
    let path = next_child_path(tree, parent);
    if let Some(path) = &path {
        fields.insert(WBS_FIELD.to_string(), CellValue::text(path.dotted()));
    }
    tree.append(parent, id.clone(), path, fields)?;
    tracing::info!("Added row {id}");
    Ok(id)
}

/// Delete a confirmed row and everything below it. Returns the removed ids.
pub fn delete_row(
    tree: &mut RowTree,
    id: &RowId,
    confirmation: DeleteConfirmation,
) -> Result<Vec<RowId>> {
    if confirmation.row != *id {
        return Err(TableError::ConfirmationMismatch {
            confirmed: confirmation.row,
            requested: id.clone(),
        });
    }
    if !tree.contains(id) {
        return Err(TableError::UnknownRow(id.clone()));
    }
    let removed = tree.remove_subtree(id);
    tracing::info!("Deleted {} rows starting at {id}", removed.len());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{FlatRecord, NestedRecord};

    fn rid(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn wbs_tree() -> RowTree {
        let records = [("p", "1"), ("a", "1.1"), ("b", "1.3"), ("q", "2")]
            .into_iter()
            .map(|(id, outline)| {
                FlatRecord::new(rid(id), HierarchyPath::from_outline(outline).unwrap())
            });
        RowTree::from_flat(records).0
    }

    #[test]
    fn child_number_follows_highest_sibling() {
        let tree = wbs_tree();
        let path = next_child_path(&tree, Some(&rid("p"))).unwrap();
        assert_eq!(path.dotted(), "1.4");
        assert_eq!(path.segments(), ["1", "1.4"]);

        let first = next_child_path(&tree, Some(&rid("a"))).unwrap();
        assert_eq!(first.dotted(), "1.1.1");

        assert_eq!(next_child_path(&tree, None).unwrap().dotted(), "3");
        assert_eq!(next_child_path(&tree, Some(&rid("zz"))).unwrap().dotted(), "3");
    }

    #[test]
    fn unnumbered_trees_stay_unnumbered() {
        let (tree, _) = RowTree::from_nested([NestedRecord::new(rid("phase_1"))]);
        assert!(next_child_path(&tree, None).is_none());
        assert!(next_child_path(&tree, Some(&rid("phase_1"))).is_none());
        assert_eq!(next_child_path(&RowTree::new(), None).unwrap().dotted(), "1");
    }

    #[test]
    fn new_ids_carry_kind() {
        let id = new_row_id(Some("task")).unwrap();
        assert_eq!(id.kind_prefix(), Some("task"));
        assert_eq!(id.as_str().len(), "task_".len() + 36);
        assert_ne!(new_row_id(None).unwrap(), new_row_id(None).unwrap());
    }

    #[test]
    fn append_outcome_numbers_the_row() {
        let mut tree = wbs_tree();
        let mut fields = Fields::new();
        fields.insert("name".to_string(), "Survey".into());
        let id = apply_outcome(
            &mut tree,
            DialogOutcome::Append {
                parent: Some(rid("p")),
                kind: None,
                fields,
            },
        )
        .unwrap();

        let row = tree.get(&id).unwrap();
        assert_eq!(row.parent, Some(rid("p")));
        assert_eq!(row.depth, 1);
        assert_eq!(row.value(WBS_FIELD), &CellValue::text("1.4"));
        assert_eq!(tree.children(&rid("p")).last(), Some(&id));
    }

    #[test]
    fn replace_keeps_place_and_number() {
        let mut tree = wbs_tree();
        let mut fields = Fields::new();
        fields.insert("name".to_string(), "Renamed".into());
        apply_outcome(
            &mut tree,
            DialogOutcome::Replace {
                row: rid("b"),
                fields,
            },
        )
        .unwrap();
        let row = tree.get(&rid("b")).unwrap();
        assert_eq!(row.value("name"), &CellValue::text("Renamed"));
        assert_eq!(row.value(WBS_FIELD), &CellValue::text("1.3"));

        let missing = apply_outcome(
            &mut tree,
            DialogOutcome::Replace {
                row: rid("zz"),
                fields: Fields::new(),
            },
        );
        assert_eq!(missing, Err(TableError::UnknownRow(rid("zz"))));
    }

    #[test]
    fn duplicate_creates_next_sibling() {
        let mut tree = wbs_tree();
        let copy = duplicate_row(&mut tree, &rid("a")).unwrap();
        let row = tree.get(&copy).unwrap();
        assert_eq!(row.parent, Some(rid("p")));
        assert_eq!(row.path.as_ref().unwrap().dotted(), "1.4");
        assert!(duplicate_row(&mut tree, &rid("zz")).is_err());
    }

    #[test]
    fn delete_requires_matching_confirmation() {
        let mut tree = wbs_tree();
        assert!(confirm_delete(&tree, &rid("zz")).is_none());

        let confirmation = confirm_delete(&tree, &rid("q")).unwrap();
        let err = delete_row(&mut tree, &rid("p"), confirmation).unwrap_err();
        assert!(matches!(err, TableError::ConfirmationMismatch { .. }));
        assert_eq!(tree.len(), 4);

        let confirmation = confirm_delete(&tree, &rid("p")).unwrap();
        let removed = delete_row(&mut tree, &rid("p"), confirmation).unwrap();
        assert_eq!(removed, vec![rid("p"), rid("a"), rid("b")]);
        assert_eq!(tree.ids(), vec![rid("q")]);
    }
}
