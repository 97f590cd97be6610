//! Error types for hygrolog-store.

use std::path::PathBuf;

/// Result type for hygrolog-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hygrolog-store.
///
/// Note that a missing or corrupt data file on *load* is not an error: the
/// store treats it as an empty collection. These variants cover failures to
/// write data back and to set up the data directory.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the data directory.
    #[error("Failed to create data directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
