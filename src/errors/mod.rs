//! Domain error types for taskboard
//!
//! Every store operation returns [`TrackerResult`]. Errors are detected inside the
//! operation that discovers them and returned immediately; partial writes are
//! prevented by the enclosing transaction, never by compensating actions.
//!
//! # Error Categories
//!
//! - **NotFound**: the id passed to get/update/delete does not exist
//! - **InvalidReference**: a foreign key in a create/update payload points nowhere
//! - **DanglingReference**: the store itself rejected a foreign key
//! - **Conflict**: duplicate unique name, or a delete blocked by children
//! - **InvalidArgument**: malformed input such as an unparsable date
//! - **Database / Internal**: unexpected store failures
//!
//! # Examples
//!
//! ```rust
//! use taskboard::errors::TrackerError;
//! use taskboard::services::EntityKind;
//!
//! let err = TrackerError::NotFound { entity: EntityKind::Team, id: 7 };
//! assert_eq!(err.to_string(), "Team 7 not found");
//! assert_eq!(err.error_code(), "NOT_FOUND");
//! ```

pub mod db;

pub use db::DbErrorKind;

use sea_orm::DbErr;
use thiserror::Error;

use crate::services::EntityKind;

/// Errors surfaced by the entity store and its services
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Entity id does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    /// Foreign key in a payload does not resolve to an existing parent
    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: EntityKind, id: i32 },

    /// Foreign key rejected by the store itself, e.g. a parent deleted concurrently
    #[error("Invalid reference: {0}")]
    DanglingReference(String),

    /// Unique constraint violated or delete blocked by children
    #[error("{0}")]
    Conflict(String),

    /// Malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected store failure
    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for store operations
pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        TrackerError::NotFound { entity, id }
    }

    pub fn invalid_reference(entity: EntityKind, id: i32) -> Self {
        TrackerError::InvalidReference { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TrackerError::Conflict(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TrackerError::InvalidArgument(message.into())
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::NotFound { .. }
                | TrackerError::InvalidReference { .. }
                | TrackerError::DanglingReference(_)
                | TrackerError::Conflict(_)
                | TrackerError::InvalidArgument(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            TrackerError::NotFound { .. } => "NOT_FOUND",
            TrackerError::InvalidReference { .. } | TrackerError::DanglingReference(_) => {
                "INVALID_REFERENCE"
            }
            TrackerError::Conflict(_) => "CONFLICT",
            TrackerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            TrackerError::Database(_) | TrackerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DbErr> for TrackerError {
    fn from(err: DbErr) -> Self {
        match DbErrorKind::from_db_err(&err) {
            DbErrorKind::UniqueViolation => {
                TrackerError::Conflict(format!("Unique constraint violated: {}", err))
            }
            DbErrorKind::ForeignKeyViolation => {
                let message = format!("Foreign key constraint violated: {}", err);
                TrackerError::DanglingReference(message)
            }
            _ => TrackerError::Database(err),
        }
    }
}
