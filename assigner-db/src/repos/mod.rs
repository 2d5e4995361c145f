//! Repository modules for database operations
//!
//! Each repository owns a pool handle and implements one of the
//! `assigner-core` store traits. Database failures are classified into
//! [`assigner_core::Error`] here, so nothing above this layer sees sqlx.

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestsRepo;
pub use teams::TeamsRepo;
pub use users::UsersRepo;

/// Whether the error is a unique or primary key violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
