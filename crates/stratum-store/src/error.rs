//! Store error types

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error while preparing the data directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Canonical id already present; the write was not applied
    #[error("Canonical entry already exists: {0}")]
    AlreadyExists(String),

    /// Task ledger record already initialised
    #[error("Task already initialized: {0}")]
    AlreadyInitialized(String),

    /// Referenced record is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A writer panicked while holding a resource lock
    #[error("Store lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
