//! Error types for save and profile persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for persistence operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Errors that can occur while reading or writing saves and profiles.
/// None of them touch the in-memory session.
#[derive(Debug, Error)]
pub enum SaveError {
    /// A file could not be read or written.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file is not valid JSON or does not match the record format.
    #[error("corrupt record {}: {message}", .path.display())]
    Corrupt {
        /// The file involved.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// A save could not be brought to the current schema version.
    #[error("cannot migrate save: {0}")]
    Migration(String),

    /// A slot name has no usable characters.
    #[error("invalid slot name '{0}': use letters, digits, '-' or '_'")]
    InvalidSlot(String),

    /// The autosave slot is reserved for the engine.
    #[error("the autosave slot is reserved")]
    ReservedSlot,

    /// Nothing has been saved in a slot.
    #[error("no save found for slot '{0}'")]
    NotFound(String),
}
