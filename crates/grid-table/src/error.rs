//! Error types for table state operations.
//!
//! Most store operations are total and ignore unknown identifiers. Errors are
//! reserved for edits whose target must exist and for deletes whose
//! confirmation does not match.

use grid_model::{ModelError, RowId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row not found: {0}")]
    UnknownRow(RowId),

    #[error("row already exists: {0}")]
    DuplicateRow(RowId),

    #[error("delete confirmation is for {confirmed}, not {requested}")]
    ConfirmationMismatch { confirmed: RowId, requested: RowId },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, TableError>;
