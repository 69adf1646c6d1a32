//! The persisted table layout.

use std::collections::BTreeMap;

use grid_model::{ColumnId, RowId};
use serde::{Deserialize, Serialize};

/// One saved blob per table: column layout, selection and expansion.
///
/// Field names follow the camelCase layout used by browser-side grids so
/// blobs written by either side stay interchangeable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStatus {
    pub column_order: Vec<ColumnId>,
    pub column_visibility: BTreeMap<ColumnId, bool>,
    pub column_sizing: BTreeMap<ColumnId, f64>,
    pub column_pinning: ColumnPinning,
    pub row_selection: BTreeMap<RowId, bool>,
    pub expanded: ExpandedSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPinning {
    pub left: Vec<ColumnId>,
    pub right: Vec<ColumnId>,
}

/// Either a single "everything expanded / collapsed" flag or a per-row map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpandedSnapshot {
    All(bool),
    Rows(BTreeMap<RowId, bool>),
}

impl Default for ExpandedSnapshot {
    fn default() -> Self {
        Self::All(true)
    }
}

impl TableStatus {
    /// Parse a stored blob.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Row identifiers whose selection flag is set.
    pub fn selected_rows(&self) -> impl Iterator<Item = &RowId> {
        self.row_selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id)
    }
}
