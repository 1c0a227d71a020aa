// ABOUTME: Core metadata model: systems, their prompts and column descriptions
// ABOUTME: Every mutation is written back through a QueryRunner as it happens

pub mod catalog;
pub mod column;
pub mod statements;
pub mod system;

pub use catalog::MetadataCatalog;
pub use column::ColumnMetadata;
pub use system::{PromptKind, SystemMetadata};

use thiserror::Error;

use crate::db::QueryError;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("System not found: {0}")]
    SystemNotFound(String),
    #[error("Column not found: {column} in system {system}")]
    ColumnNotFound { system: String, column: String },
}

/// Result of a write-through operation that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing to write; no statement was issued
    Unchanged,
    /// The new value was written to storage
    Persisted,
}
