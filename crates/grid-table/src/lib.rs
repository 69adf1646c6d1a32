//! Headless state for hierarchical data tables.
//!
//! A [`TableState`] owns every store of one table:
//!
//! - [`RowTree`]: rows built from hierarchy paths or nested records
//! - [`ExpansionStore`]: which rows show their sub-rows
//! - [`Projector`]: the flattened list of rows on screen
//! - [`ColumnLayout`]: order, visibility, width, pinning and sort
//! - [`SelectionStore`]: selected rows
//! - [`EditDialog`]: the add / edit flow
//!
//! Pages mutate state through [`TableAction`]s and observe it through
//! [`TableEvent`] subscriptions. Operations on unknown rows or columns are
//! ignored rather than reported.

pub mod columns;
pub mod dialog;
pub mod editing;
pub mod error;
pub mod expansion;
pub mod projector;
pub mod selection;
pub mod state;
pub mod tree;

pub use columns::{ColumnDrag, ColumnLayout, PinOffset, PinnedGroups, SortKey};
pub use dialog::{DialogMode, DialogOutcome, DialogState, EditDialog};
pub use editing::{
    DeleteConfirmation, WBS_FIELD, apply_outcome, confirm_delete, delete_row, duplicate_row,
    new_row_id, next_child_path,
};
pub use error::{Result, TableError};
pub use expansion::{ExpansionState, ExpansionStore};
pub use projector::{Projector, project, project_sorted};
pub use selection::SelectionStore;
pub use state::{
    RowSource, SubscriptionId, TableAction, TableConfig, TableEvent, TableState, TableView,
};
pub use tree::{BuildReport, PreOrder, RowTree};
