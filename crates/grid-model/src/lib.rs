//! Data model shared by the tree grid crates: identifiers, hierarchy paths,
//! rows, cell values and column descriptors.

pub mod column;
pub mod error;
pub mod ids;
pub mod path;
pub mod row;
pub mod value;

pub use column::{
    CellFormatter, ColumnDescriptor, DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
    PinSide, SortDirection,
};
pub use error::{ModelError, Result};
pub use ids::{ColumnId, RowId};
pub use path::HierarchyPath;
pub use row::{Fields, FlatRecord, NestedRecord, Row};
pub use value::CellValue;
