//! Persistent storage for table layouts.
//!
//! Each table keeps one JSON blob in a key-value store: column order,
//! visibility, sizing and pinning, selected rows and expanded rows.
//!
//! # Example
//!
//! ```ignore
//! use grid_persistence::{FileStore, StatusRepository, TableStatus};
//!
//! let mut repo = StatusRepository::new(FileStore::new("state"));
//! let status = repo.load_or_else("enhanced-table", TableStatus::default);
//! repo.save("enhanced-table", &status)?;
//! ```
//!
//! Missing or malformed blobs never fail a load; the caller gets its
//! defaults and a warning is logged.

mod autosave;
mod error;
mod repository;
mod status;
mod store;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use error::{PersistenceError, Result};
pub use repository::StatusRepository;
pub use status::{ColumnPinning, ExpandedSnapshot, TableStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
