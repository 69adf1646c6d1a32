//! Column descriptors and their layout attributes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{CellValue, ColumnId, Row};

/// Width used when a column declares none.
pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

/// Narrowest width a resize may produce.
pub const MIN_COLUMN_WIDTH: u32 = 40;

/// Widest width a resize or a saved layout may produce.
pub const MAX_COLUMN_WIDTH: u32 = 4_000;

/// Edge a column is fixed to during horizontal scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    #[default]
    None,
    Left,
    Right,
}

impl PinSide {
    pub const fn is_pinned(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next state of the header sort toggle.
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }
}

/// Opaque cell rendering callback supplied by the page.
#[derive(Clone)]
pub struct CellFormatter(Arc<dyn Fn(&CellValue) -> String + Send + Sync>);

impl CellFormatter {
    pub fn new(f: impl Fn(&CellValue) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn format(&self, value: &CellValue) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for CellFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellFormatter(..)")
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    pub header: String,
    /// Row field the column reads; defaults to the column id.
    pub field: String,
    pub default_width: u32,
    pub width: u32,
    pub pin: PinSide,
    pub visible: bool,
    pub sort: SortDirection,
    pub sortable: bool,
    pub hideable: bool,
    /// Selection checkboxes and action menus: no data, no export, no drag handle.
    pub structural: bool,
    pub formatter: Option<CellFormatter>,
}

impl ColumnDescriptor {
    pub fn new(id: ColumnId, header: impl Into<String>) -> Self {
        let field = id.as_str().to_string();
        Self {
            id,
            header: header.into(),
            field,
            default_width: DEFAULT_COLUMN_WIDTH,
            width: DEFAULT_COLUMN_WIDTH,
            pin: PinSide::None,
            visible: true,
            sort: SortDirection::None,
            sortable: true,
            hideable: true,
            structural: false,
            formatter: None,
        }
    }

    /// A structural column such as the selection checkbox.
    pub fn structural(id: ColumnId, header: impl Into<String>, width: u32) -> Self {
        Self {
            sortable: false,
            hideable: false,
            structural: true,
            ..Self::new(id, header).with_width(width)
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.default_width = width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        self.width = self.default_width;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    #[must_use]
    pub fn with_pin(mut self, pin: PinSide) -> Self {
        self.pin = pin;
        self
    }

    #[must_use]
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn with_hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    #[must_use]
    pub fn with_formatter(
        mut self,
        f: impl Fn(&CellValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(CellFormatter::new(f));
        self
    }

    pub fn render(&self, row: &Row) -> String {
        let value = row.value(&self.field);
        match &self.formatter {
            Some(formatter) => formatter.format(value),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_never_below_minimum() {
        let column = ColumnDescriptor::new(ColumnId::new("a").unwrap(), "A").with_width(5);
        assert_eq!(column.width, MIN_COLUMN_WIDTH);
        assert_eq!(column.default_width, MIN_COLUMN_WIDTH);
    }

    #[test]
    fn structural_columns_are_fixed() {
        let select = ColumnDescriptor::structural(ColumnId::new("select").unwrap(), "", 40);
        assert!(select.structural);
        assert!(!select.sortable);
        assert!(!select.hideable);
    }

    #[test]
    fn sort_cycle_returns_to_none() {
        let dir = SortDirection::None.cycle().cycle().cycle();
        assert_eq!(dir, SortDirection::None);
    }
}
