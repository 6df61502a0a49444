//! Shared store error type.

use thiserror::Error;

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The addressed row does not exist for the requesting user.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store itself failed.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Creates a database error with a message.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}
