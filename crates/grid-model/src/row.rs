#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CellValue, HierarchyPath, RowId};

pub type Fields = BTreeMap<String, CellValue>;

/// A node of the row tree.
///
/// Parent and children are identifier references into the owning tree, never
/// pointers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub depth: usize,
    pub parent: Option<RowId>,
    pub children: Vec<RowId>,
    pub path: Option<HierarchyPath>,
    pub fields: Fields,
}

impl Row {
    pub fn value(&self, field: &str) -> &CellValue {
        self.fields.get(field).unwrap_or(&CellValue::Missing)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Input record carrying its position as a hierarchy path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub id: RowId,
    pub path: HierarchyPath,
    #[serde(default)]
    pub fields: Fields,
}

impl FlatRecord {
    pub fn new(id: RowId, path: HierarchyPath) -> Self {
        Self {
            id,
            path,
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<CellValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

/// Input record carrying its children inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedRecord {
    pub id: RowId,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, rename = "subRows")]
    pub children: Vec<NestedRecord>,
}

impl NestedRecord {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            fields: Fields::new(),
            children: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<CellValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: NestedRecord) -> Self {
        self.children.push(child);
        self
    }
}
