//! Database error categorization
//!
//! Sorts a sea-orm [`DbErr`] into a small set of kinds so the store can turn a
//! constraint violation raised by SQLite into the matching domain error.

use sea_orm::{DbErr, SqlErr};

/// Categories of database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Record not found (query returned no results)
    NotFound,

    /// Unique constraint violation, surfaced as `Conflict`
    UniqueViolation,

    /// Foreign key constraint violation, surfaced as `DanglingReference`
    ForeignKeyViolation,

    /// Database connection error
    ConnectionError,

    /// Query or acquire timeout
    Timeout,

    /// Unknown/other database error
    Unknown,
}

impl DbErrorKind {
    /// Categorize a sea_orm database error
    ///
    /// # Examples
    ///
    /// ```
    /// use taskboard::errors::DbErrorKind;
    /// use sea_orm::DbErr;
    ///
    /// let err = DbErr::RecordNotFound("Team not found".to_string());
    /// assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::NotFound);
    /// ```
    pub fn from_db_err(err: &DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return Self::UniqueViolation,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Self::ForeignKeyViolation,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            DbErr::Conn(_) => {
                if err.to_string().to_lowercase().contains("timeout") {
                    Self::Timeout
                } else {
                    Self::ConnectionError
                }
            }
            _ => {
                let message = err.to_string().to_lowercase();
                if message.contains("unique constraint") {
                    Self::UniqueViolation
                } else if message.contains("foreign key constraint") {
                    Self::ForeignKeyViolation
                } else if message.contains("timeout") || message.contains("timed out") {
                    Self::Timeout
                } else {
                    Self::Unknown
                }
            }
        }
    }
}
