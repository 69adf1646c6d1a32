use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid row id: {0:?}")]
    InvalidRowId(String),
    #[error("invalid column id: {0:?}")]
    InvalidColumnId(String),
    #[error("invalid hierarchy path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
