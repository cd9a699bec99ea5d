//! Custom error types for pagedesk.
//!
//! Every storage-touching operation returns a structured outcome instead of
//! panicking; batch operations roll back before surfacing the error.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for pagedesk operations.
#[derive(Error, Debug)]
pub enum PagedeskError {
    // =========================================================================
    // Connection Errors
    // =========================================================================
    /// Database file could not be opened.
    #[error("Failed to open database at '{path}'")]
    Connection { path: PathBuf },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Uniqueness violation detected before insert (profile id or uid).
    #[error("This {field} already exists")]
    Duplicate { field: &'static str },

    /// Required field missing or referenced record does not exist.
    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    /// A batch operation had zero eligible rows after filtering.
    #[error("No valid rows: {context}")]
    NoValidRows { context: String },

    /// Record lookup by id failed.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    // =========================================================================
    // Storage / IO Errors
    // =========================================================================
    /// Underlying constraint violation or I/O failure during execute/commit.
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Delimited-file read/write error during backup, restore, or import.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization failure (used-folders list, bulk-edit update files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File read/write error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pagedesk operations.
pub type Result<T> = std::result::Result<T, PagedeskError>;

impl PagedeskError {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a no-valid-rows error for a filtered-out batch.
    pub fn no_valid_rows(context: impl Into<String>) -> Self {
        Self::NoValidRows {
            context: context.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub const fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Check if this error is recoverable (user can fix the input and retry).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Duplicate { .. }
                | Self::Validation { .. }
                | Self::NoValidRows { .. }
                | Self::NotFound { .. }
        )
    }

    /// Get a suggestion for how to fix this error, if applicable.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Duplicate { .. } => {
                Some("Use 'pagedesk account list' to inspect existing profile ids and uids.")
            }
            Self::NotFound { .. } => {
                Some("Soft-deleted records keep their ids; check 'pagedesk bin list'.")
            }
            Self::Connection { .. } => {
                Some("Check the --db path (or PAGEDESK_DB) and file permissions.")
            }
            _ => None,
        }
    }
}
