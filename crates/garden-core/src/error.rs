//! Error types for the knowledge-garden core.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for knowledge-garden operations.
///
/// The variants map onto the boundary taxonomy: validation, not-found,
/// conflict, forbidden, transient, internal. Driver errors arrive through
/// the `From<sqlx::Error>` classifier below so the common kinds keep their
/// identity across the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Request shape or field bounds violated.
    #[error("Validation failed: {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Resource not found (or not visible to the owner).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Tag not found
    #[error("Tag not found: {0}")]
    TagNotFound(Uuid),

    /// Uniqueness violation (tag name, user email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Reserved for policy layers; owner scoping degenerates to NotFound.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Store unavailable, pool exhausted, or query cancelled. Safe to retry.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Unclassified database error (wraps sqlx::Error).
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invariant violation or unexpected backend state. Never retried.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for validation failures.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether a retry of the failed operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    /// Whether this error means the addressed entity is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::NoteNotFound(_) | Error::TagNotFound(_)
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::NotFound("row not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                Error::Transient(e.to_string())
            }
            sqlx::Error::Io(io) => Error::Transient(io.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(db.message().to_string())
            }
            other => Error::Database(other),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
