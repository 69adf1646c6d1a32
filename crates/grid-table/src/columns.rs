//! Column order, visibility, width, pinning and sort.
//!
//! Every attribute is independent: hiding a column keeps its place in the
//! order, its width and its pin, so showing it again restores all three.

use grid_model::{
    ColumnDescriptor, ColumnId, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH, PinSide, SortDirection,
};
use grid_persistence::TableStatus;

use crate::tree::next_revision;

/// The column the rows are currently sorted by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: ColumnId,
    pub field: String,
    pub direction: SortDirection,
}

/// Visible columns split by pin side, each group in column order.
#[derive(Debug, Default)]
pub struct PinnedGroups<'a> {
    pub left: Vec<&'a ColumnDescriptor>,
    pub center: Vec<&'a ColumnDescriptor>,
    pub right: Vec<&'a ColumnDescriptor>,
}

impl<'a> PinnedGroups<'a> {
    /// Left to right as rendered.
    pub fn iter(&self) -> impl Iterator<Item = &'a ColumnDescriptor> + '_ {
        self.left
            .iter()
            .chain(&self.center)
            .chain(&self.right)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.left.len() + self.center.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sticky placement of one pinned column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinOffset {
    pub column: ColumnId,
    pub side: PinSide,
    /// Distance from the pinned edge: widths of the pinned columns between
    /// this one and its edge.
    pub offset: u32,
    /// Draws the shadow separating the left group from the scrolling area.
    pub is_last_left: bool,
    pub is_first_right: bool,
}

#[derive(Debug, Clone)]
pub struct ColumnLayout {
    /// Declaration order; never reordered.
    columns: Vec<ColumnDescriptor>,
    order: Vec<ColumnId>,
    min_width: u32,
    revision: u64,
}

impl ColumnLayout {
    /// Build a layout in declaration order. Later duplicates of an id are
    /// dropped.
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        let mut unique: Vec<ColumnDescriptor> = Vec::new();
        for column in columns {
            if unique.iter().any(|c| c.id == column.id) {
                tracing::warn!("Ignoring duplicate column {}", column.id);
                continue;
            }
            unique.push(column);
        }
        let order = unique.iter().map(|c| c.id.clone()).collect();
        Self {
            columns: unique,
            order,
            min_width: MIN_COLUMN_WIDTH,
            revision: next_revision(),
        }
    }

    #[must_use]
    pub fn with_min_width(mut self, min_width: u32) -> Self {
        let min_width = min_width.min(MAX_COLUMN_WIDTH);
        self.min_width = min_width;
        for column in &mut self.columns {
            column.width = column.width.max(min_width);
        }
        self
    }

    fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_width, MAX_COLUMN_WIDTH)
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| &c.id == id)
    }

    fn column_mut(&mut self, id: &ColumnId) -> Option<&mut ColumnDescriptor> {
        let found = self.columns.iter_mut().find(|c| &c.id == id);
        if found.is_none() {
            tracing::debug!("Ignoring operation on unknown column {id}");
        }
        found
    }

    /// Current order; always a permutation of every declared column.
    pub fn order(&self) -> &[ColumnId] {
        &self.order
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    /// Move `moved` to the index currently held by `target`.
    pub fn reorder(&mut self, moved: &ColumnId, target: &ColumnId) -> bool {
        if moved == target {
            return false;
        }
        let from = self.order.iter().position(|id| id == moved);
        let to = self.order.iter().position(|id| id == target);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!("Ignoring reorder of {moved} onto {target}");
            return false;
        };
        let id = self.order.remove(from);
        self.order.insert(to, id);
        self.touch();
        true
    }

    pub fn resize(&mut self, id: &ColumnId, width: u32) -> bool {
        let width = self.clamp_width(width);
        let Some(column) = self.column_mut(id) else {
            return false;
        };
        column.width = width;
        self.touch();
        true
    }

    pub fn pin(&mut self, id: &ColumnId, side: PinSide) -> bool {
        let Some(column) = self.column_mut(id) else {
            return false;
        };
        column.pin = side;
        self.touch();
        true
    }

    /// Show or hide a hideable column.
    pub fn set_visibility(&mut self, id: &ColumnId, visible: bool) -> bool {
        let Some(column) = self.column_mut(id) else {
            return false;
        };
        if !column.hideable {
            tracing::debug!("Column {id} cannot be hidden");
            return false;
        }
        column.visible = visible;
        self.touch();
        true
    }

    pub fn reset_sizing(&mut self) {
        let min_width = self.min_width;
        for column in &mut self.columns {
            column.width = column.default_width.max(min_width);
        }
        self.touch();
    }

    /// Advance the sort of `id` and clear every other column's sort.
    pub fn toggle_sort(&mut self, id: &ColumnId) -> bool {
        match self.column(id) {
            Some(column) if column.sortable => {}
            Some(_) => {
                tracing::debug!("Column {id} is not sortable");
                return false;
            }
            None => {
                tracing::debug!("Ignoring sort on unknown column {id}");
                return false;
            }
        }
        for column in &mut self.columns {
            column.sort = if &column.id == id {
                column.sort.cycle()
            } else {
                SortDirection::None
            };
        }
        self.touch();
        true
    }

    pub fn active_sort(&self) -> Option<SortKey> {
        self.columns
            .iter()
            .find(|c| c.sort != SortDirection::None)
            .map(|c| SortKey {
                column: c.id.clone(),
                field: c.field.clone(),
                direction: c.sort,
            })
    }

    /// Hideable columns whose id or header contains `keyword`, ignoring case.
    pub fn search_hideable(&self, keyword: &str) -> Vec<&ColumnDescriptor> {
        let needle = keyword.trim().to_lowercase();
        self.ordered()
            .filter(|c| c.hideable)
            .filter(|c| {
                needle.is_empty()
                    || c.id.as_str().to_lowercase().contains(&needle)
                    || c.header.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// All columns, hidden ones included, in current order.
    pub fn ordered(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.order.iter().filter_map(|id| self.column(id))
    }

    pub fn rendered_groups(&self) -> PinnedGroups<'_> {
        let mut groups = PinnedGroups::default();
        for column in self.ordered().filter(|c| c.visible) {
            match column.pin {
                PinSide::Left => groups.left.push(column),
                PinSide::None => groups.center.push(column),
                PinSide::Right => groups.right.push(column),
            }
        }
        groups
    }

    pub fn pin_offsets(&self) -> Vec<PinOffset> {
        let groups = self.rendered_groups();
        let mut offsets = Vec::with_capacity(groups.left.len() + groups.right.len());

        let mut start = 0u32;
        for (index, column) in groups.left.iter().enumerate() {
            offsets.push(PinOffset {
                column: column.id.clone(),
                side: PinSide::Left,
                offset: start,
                is_last_left: index + 1 == groups.left.len(),
                is_first_right: false,
            });
            start = start.saturating_add(column.width);
        }

        for (index, column) in groups.right.iter().enumerate() {
            let after = groups.right[index + 1..]
                .iter()
                .fold(0u32, |sum, c| sum.saturating_add(c.width));
            offsets.push(PinOffset {
                column: column.id.clone(),
                side: PinSide::Right,
                offset: after,
                is_last_left: false,
                is_first_right: index == 0,
            });
        }
        offsets
    }

    /// Sum of visible widths.
    pub fn total_width(&self) -> u32 {
        self.rendered_groups()
            .iter()
            .fold(0u32, |sum, c| sum.saturating_add(c.width))
    }

    /// Reconcile a persisted layout with the declared columns.
    ///
    /// Unknown ids are dropped, columns missing from the saved order are
    /// appended in declaration order and widths are clamped. Pinning lists
    /// are authoritative: a column in neither list is unpinned.
    pub fn apply_status(&mut self, status: &TableStatus) {
        if !status.column_order.is_empty() {
            let mut order: Vec<ColumnId> = Vec::with_capacity(self.columns.len());
            for id in &status.column_order {
                if self.column(id).is_some() && !order.contains(id) {
                    order.push(id.clone());
                }
            }
            for column in &self.columns {
                if !order.contains(&column.id) {
                    order.push(column.id.clone());
                }
            }
            self.order = order;
        }

        let (min_width, max_width) = (self.min_width, MAX_COLUMN_WIDTH);
        for column in &mut self.columns {
            if let Some(visible) = status.column_visibility.get(&column.id)
                && column.hideable
            {
                column.visible = *visible;
            }
            if let Some(width) = status.column_sizing.get(&column.id)
                && width.is_finite()
                && *width >= 0.0
            {
                column.width = (width.round() as u32).clamp(min_width, max_width);
            }
            column.pin = if status.column_pinning.left.contains(&column.id) {
                PinSide::Left
            } else if status.column_pinning.right.contains(&column.id) {
                PinSide::Right
            } else {
                PinSide::None
            };
        }
        self.touch();
    }

    /// Copy the column attributes into `status`.
    pub fn write_status(&self, status: &mut TableStatus) {
        status.column_order = self.order.clone();
        status.column_visibility = self
            .columns
            .iter()
            .map(|c| (c.id.clone(), c.visible))
            .collect();
        status.column_sizing = self
            .columns
            .iter()
            .map(|c| (c.id.clone(), f64::from(c.width)))
            .collect();
        let pinned = |side| {
            self.ordered()
                .filter(|c| c.pin == side)
                .map(|c| c.id.clone())
                .collect()
        };
        status.column_pinning.left = pinned(PinSide::Left);
        status.column_pinning.right = pinned(PinSide::Right);
    }
}

/// A header drag in progress.
///
/// Pointer moves only record the hovered column; the layout changes once, on
/// a drop over a valid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDrag {
    moved: ColumnId,
    target: Option<ColumnId>,
}

impl ColumnDrag {
    /// Start dragging `moved`. Structural and unknown columns have no handle.
    pub fn start(layout: &ColumnLayout, moved: &ColumnId) -> Option<Self> {
        match layout.column(moved) {
            Some(column) if !column.structural => Some(Self {
                moved: moved.clone(),
                target: None,
            }),
            _ => {
                tracing::debug!("Column {moved} cannot be dragged");
                None
            }
        }
    }

    pub fn moved(&self) -> &ColumnId {
        &self.moved
    }

    pub fn target(&self) -> Option<&ColumnId> {
        self.target.as_ref()
    }

    pub fn over(&mut self, target: &ColumnId) {
        self.target = Some(target.clone());
    }

    /// Pointer left every drop target.
    pub fn leave(&mut self) {
        self.target = None;
    }

    /// Drop. Returns whether the order changed.
    pub fn finish(self, layout: &mut ColumnLayout) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        match layout.column(&target) {
            Some(column) if !column.structural => layout.reorder(&self.moved, &target),
            _ => false,
        }
    }

    pub fn cancel(self) {
        tracing::debug!("Cancelled drag of column {}", self.moved);
    }
}
