//! Error types for cfstore
//!
//! Provides a unified error type for all storage operations.

use thiserror::Error;

use crate::storage::StorageState;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for cfstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("Engine error: {0}")]
    Engine(#[from] redb::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown column family: {0}")]
    UnknownColumnFamily(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Storage is not running (state: {state})")]
    NotRunning { state: StorageState },

    #[error("Storage already started")]
    AlreadyStarted,

    #[error("Reader used after close")]
    ReaderClosed,

    #[error("Engine stopped while reader was outstanding")]
    EngineStopped,

    #[error("Iterator accessed while not positioned on an entry")]
    InvalidIterator,
}

// redb reports each phase with its own error type; all of them fold into
// the umbrella `redb::Error` so callers see a single engine variant.
macro_rules! engine_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Engine(redb::Error::from(err))
                }
            }
        )*
    };
}

engine_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
