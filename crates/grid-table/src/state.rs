//! One table: its configuration, its stores and the action dispatcher.

use std::fmt;

use grid_model::{
    CellValue, ColumnDescriptor, ColumnId, FlatRecord, NestedRecord, PinSide, Row, RowId,
};
use grid_persistence::{ExpandedSnapshot, TableStatus};

use crate::columns::{ColumnLayout, PinOffset, PinnedGroups};
use crate::dialog::EditDialog;
use crate::editing::{self, DeleteConfirmation};
use crate::error::Result;
use crate::expansion::{ExpansionState, ExpansionStore};
use crate::projector::Projector;
use crate::selection::SelectionStore;
use crate::tree::{BuildReport, RowTree};

/// Where a table's rows come from.
#[derive(Debug, Clone)]
pub enum RowSource {
    Flat(Vec<FlatRecord>),
    Nested(Vec<NestedRecord>),
}

impl Default for RowSource {
    fn default() -> Self {
        Self::Nested(Vec::new())
    }
}

impl RowSource {
    pub fn build(self) -> (RowTree, BuildReport) {
        match self {
            Self::Flat(records) => RowTree::from_flat(records),
            Self::Nested(records) => RowTree::from_nested(records),
        }
    }
}

/// Per-page table configuration.
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    pub columns: Vec<ColumnDescriptor>,
    pub min_column_width: Option<u32>,
    /// Key of the persisted layout; `None` keeps the layout in memory only.
    pub storage_key: Option<String>,
    pub initial_expansion: ExpansionState,
    pub rows: RowSource,
}

impl TableConfig {
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_min_column_width(mut self, width: u32) -> Self {
        self.min_column_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_initial_expansion(mut self, expansion: ExpansionState) -> Self {
        self.initial_expansion = expansion;
        self
    }

    #[must_use]
    pub fn with_flat_rows(mut self, rows: impl IntoIterator<Item = FlatRecord>) -> Self {
        self.rows = RowSource::Flat(rows.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_nested_rows(mut self, rows: impl IntoIterator<Item = NestedRecord>) -> Self {
        self.rows = RowSource::Nested(rows.into_iter().collect());
        self
    }
}

/// Every mutation a page can request.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    ToggleExpanded(RowId),
    SetAllExpanded(bool),
    ToggleAllExpanded,
    ReorderColumn { moved: ColumnId, target: ColumnId },
    ResizeColumn { column: ColumnId, width: u32 },
    PinColumn { column: ColumnId, side: PinSide },
    SetColumnVisibility { column: ColumnId, visible: bool },
    ResetColumnSizing,
    ToggleSort(ColumnId),
    ToggleRowSelected(RowId),
    SetRowSelected { row: RowId, selected: bool },
    ToggleAllSelected,
    OpenNewRow { parent: Option<RowId>, kind: Option<String> },
    OpenEditRow(RowId),
    SetDraftField { name: String, value: CellValue },
    SubmitDialog,
    CancelDialog,
    DuplicateRow(RowId),
    DeleteRow(DeleteConfirmation),
}

/// Which store an accepted action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    ExpansionChanged,
    ColumnsChanged,
    SortChanged,
    SelectionChanged,
    DialogChanged,
    RowAdded(RowId),
    RowEdited(RowId),
    RowsRemoved(Vec<RowId>),
    Reloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TableEvent)>;

/// Rows and columns ready to render.
#[derive(Debug)]
pub struct TableView<'a> {
    pub rows: Vec<&'a Row>,
    pub groups: PinnedGroups<'a>,
    pub pin_offsets: Vec<PinOffset>,
    pub expansion: &'a ExpansionStore,
    pub selection: &'a SelectionStore,
}

pub struct TableState {
    storage_key: Option<String>,
    tree: RowTree,
    report: BuildReport,
    expansion: ExpansionStore,
    projector: Projector,
    layout: ColumnLayout,
    selection: SelectionStore,
    dialog: EditDialog,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("storage_key", &self.storage_key)
            .field("rows", &self.tree.len())
            .field("columns", &self.layout.order())
            .field("selected", &self.selection.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl TableState {
    pub fn new(config: TableConfig) -> Self {
        let (tree, report) = config.rows.build();
        if !report.is_clean() {
            tracing::warn!(
                orphans = report.orphans.len(),
                duplicates = report.duplicates.len(),
                "Row data has structural problems"
            );
        }
        let mut layout = ColumnLayout::new(config.columns);
        if let Some(width) = config.min_column_width {
            layout = layout.with_min_width(width);
        }
        Self {
            storage_key: config.storage_key,
            tree,
            report,
            expansion: ExpansionStore::new(config.initial_expansion),
            projector: Projector::new(),
            layout,
            selection: SelectionStore::new(),
            dialog: EditDialog::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn tree(&self) -> &RowTree {
        &self.tree
    }

    /// Problems found when the current tree was built.
    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    pub fn expansion(&self) -> &ExpansionStore {
        &self.expansion
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn dialog(&self) -> &EditDialog {
        &self.dialog
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TableEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &TableEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Apply one action. Returns the event it produced, or `None` when the
    /// action changed nothing (unknown ids, closed dialog).
    pub fn dispatch(&mut self, action: TableAction) -> Result<Option<TableEvent>> {
        tracing::debug!(?action, "Dispatching table action");
        let event = self.apply(action)?;
        if let Some(event) = &event {
            self.emit(event);
        }
        Ok(event)
    }

    fn apply(&mut self, action: TableAction) -> Result<Option<TableEvent>> {
        use TableAction as A;
        use TableEvent as E;

        let changed = |ok: bool, event: TableEvent| ok.then_some(event);

        let event = match action {
            A::ToggleExpanded(id) => {
                changed(self.expansion.toggle(&self.tree, &id), E::ExpansionChanged)
            }
            A::SetAllExpanded(expanded) => {
                self.expansion.set_all(expanded);
                Some(E::ExpansionChanged)
            }
            A::ToggleAllExpanded => {
                self.expansion.toggle_all();
                Some(E::ExpansionChanged)
            }
            A::ReorderColumn { moved, target } => {
                changed(self.layout.reorder(&moved, &target), E::ColumnsChanged)
            }
            A::ResizeColumn { column, width } => {
                changed(self.layout.resize(&column, width), E::ColumnsChanged)
            }
            A::PinColumn { column, side } => {
                changed(self.layout.pin(&column, side), E::ColumnsChanged)
            }
            A::SetColumnVisibility { column, visible } => {
                changed(self.layout.set_visibility(&column, visible), E::ColumnsChanged)
            }
            A::ResetColumnSizing => {
                self.layout.reset_sizing();
                Some(E::ColumnsChanged)
            }
            A::ToggleSort(column) => changed(self.layout.toggle_sort(&column), E::SortChanged),
            A::ToggleRowSelected(id) => {
                if self.tree.contains(&id) {
                    self.selection.toggle_row(&id);
                    Some(E::SelectionChanged)
                } else {
                    tracing::debug!("Ignoring selection of unknown row {id}");
                    None
                }
            }
            A::SetRowSelected { row, selected } => changed(
                self.tree.contains(&row) && self.selection.set_row(&row, selected),
                E::SelectionChanged,
            ),
            A::ToggleAllSelected => {
                let ids = self.tree.ids();
                self.selection.toggle_all(&ids);
                Some(E::SelectionChanged)
            }
            A::OpenNewRow { parent, kind } => {
                self.dialog.open_new(parent, kind);
                Some(E::DialogChanged)
            }
            A::OpenEditRow(id) => match self.tree.get(&id) {
                Some(row) => {
                    let fields = row.fields.clone();
                    self.dialog.open_edit(id, fields);
                    Some(E::DialogChanged)
                }
                None => {
                    tracing::debug!("Ignoring edit of unknown row {id}");
                    None
                }
            },
            A::SetDraftField { name, value } => {
                changed(self.dialog.set_field(&name, value), E::DialogChanged)
            }
            A::SubmitDialog => match self.dialog.submit() {
                Some(outcome) => {
                    let replacing = matches!(outcome, crate::dialog::DialogOutcome::Replace { .. });
                    let id = editing::apply_outcome(&mut self.tree, outcome)?;
                    Some(if replacing { E::RowEdited(id) } else { E::RowAdded(id) })
                }
                None => None,
            },
            A::CancelDialog => changed(self.dialog.cancel(), E::DialogChanged),
            A::DuplicateRow(id) => {
                let copy = editing::duplicate_row(&mut self.tree, &id)?;
                Some(E::RowAdded(copy))
            }
            A::DeleteRow(confirmation) => {
                let id = confirmation.row().clone();
                let removed = editing::delete_row(&mut self.tree, &id, confirmation)?;
                self.selection.prune(&self.tree);
                self.expansion.prune(&self.tree);
                Some(E::RowsRemoved(removed))
            }
        };
        Ok(event)
    }

    /// Token for deleting `id`; see [`editing::delete_row`].
    pub fn confirm_delete(&self, id: &RowId) -> Option<DeleteConfirmation> {
        editing::confirm_delete(&self.tree, id)
    }

    /// Swap in new row data, dropping selection and expansion entries for
    /// rows that disappeared.
    pub fn reload(&mut self, tree: RowTree) {
        self.tree = tree;
        self.report = BuildReport::default();
        let stale = self.selection.prune(&self.tree);
        self.expansion.prune(&self.tree);
        tracing::info!(
            rows = self.tree.len(),
            stale_selections = stale.len(),
            "Reloaded table rows"
        );
        self.emit(&TableEvent::Reloaded);
    }

    /// Rebuild from a row source and reload.
    pub fn reload_from(&mut self, source: RowSource) -> BuildReport {
        let (tree, report) = source.build();
        self.reload(tree);
        self.report = report.clone();
        report
    }

    pub fn visible_ids(&mut self) -> &[RowId] {
        let sort = self.layout.active_sort();
        self.projector
            .visible_ids(&self.tree, &self.expansion, sort.as_ref())
    }

    pub fn view(&mut self) -> TableView<'_> {
        let sort = self.layout.active_sort();
        self.projector
            .refresh(&self.tree, &self.expansion, sort.as_ref());
        let rows = self
            .projector
            .ids()
            .iter()
            .filter_map(|id| self.tree.get(id))
            .collect();
        TableView {
            rows,
            groups: self.layout.rendered_groups(),
            pin_offsets: self.layout.pin_offsets(),
            expansion: &self.expansion,
            selection: &self.selection,
        }
    }

    /// Current layout in its persisted form.
    pub fn status(&self) -> TableStatus {
        let mut status = TableStatus::default();
        self.layout.write_status(&mut status);
        status.row_selection = self.selection.to_map();
        status.expanded = match self.expansion.state() {
            ExpansionState::AllExpanded => ExpandedSnapshot::All(true),
            ExpansionState::AllCollapsed => ExpandedSnapshot::All(false),
            ExpansionState::PerRow(rows) => ExpandedSnapshot::Rows(rows.clone()),
        };
        status
    }

    /// Adopt a persisted layout, ignoring ids that no longer exist.
    pub fn restore(&mut self, status: &TableStatus) {
        self.layout.apply_status(status);
        self.selection.restore(&status.row_selection, &self.tree);
        self.expansion.set_state(match &status.expanded {
            ExpandedSnapshot::All(true) => ExpansionState::AllExpanded,
            ExpandedSnapshot::All(false) => ExpansionState::AllCollapsed,
            ExpandedSnapshot::Rows(rows) => ExpansionState::PerRow(rows.clone()),
        });
        self.expansion.prune(&self.tree);
        tracing::debug!("Restored table layout");
    }
}
