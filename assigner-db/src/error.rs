//! Error types for database setup

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type alias for database setup operations
pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for assigner_core::Error {
    fn from(err: DbError) -> Self {
        assigner_core::Error::internal("database", err)
    }
}
