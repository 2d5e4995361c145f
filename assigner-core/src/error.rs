//! Error types for the reviewer assignment engine
//!
//! Every failure leaving a store or a service is one of the [`Error`] kinds
//! below. The boundary maps [`ErrorCode`] to a transport status; nothing in
//! this crate knows about HTTP.

use std::fmt;

use thiserror::Error;

/// Result type alias for assignment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for assignment operations
#[derive(Error, Debug)]
pub enum Error {
    /// A team with this name already exists
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// A pull request with this id already exists
    #[error("Pull request already exists: {0}")]
    PrExists(String),

    /// The pull request is merged and can no longer change reviewers
    #[error("Pull request {0} is merged")]
    PrMerged(String),

    /// The reviewer is not currently assigned to the pull request
    #[error("Reviewer {reviewer_id} is not assigned to pull request {pr_id}")]
    NotAssigned { pr_id: String, reviewer_id: String },

    /// No active teammate is eligible to replace the reviewer
    #[error("No replacement candidate for reviewer {reviewer_id} on pull request {pr_id}")]
    NoCandidate { pr_id: String, reviewer_id: String },

    /// Referenced team, user or pull request does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Unexpected persistence or selection failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a not-found error for the given entity
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Classify an unexpected failure as internal, logging its source
    pub fn internal(operation: &str, source: impl fmt::Display) -> Self {
        tracing::error!(operation, error = %source, "Internal failure");
        Error::Internal(format!("{}: {}", operation, source))
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::TeamExists(_) => ErrorCode::TeamExists,
            Error::PrExists(_) => ErrorCode::PrExists,
            Error::PrMerged(_) => ErrorCode::PrMerged,
            Error::NotAssigned { .. } => ErrorCode::NotAssigned,
            Error::NoCandidate { .. } => ErrorCode::NoCandidate,
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::Internal(_) | Error::Config(_) => ErrorCode::InternalIssue,
        }
    }
}

/// Kind of entity referenced by a [`Error::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    User,
    PullRequest,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Team => write!(f, "Team"),
            EntityKind::User => write!(f, "User"),
            EntityKind::PullRequest => write!(f, "Pull request"),
        }
    }
}

/// Closed set of error codes exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    InternalIssue,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::PrExists => "PR_EXISTS",
            ErrorCode::PrMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalIssue => "INTERNAL_ISSUE",
        }
    }

    /// Human-readable message shown to clients
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::TeamExists => "team_name already exists",
            ErrorCode::PrExists => "PR id already exists",
            ErrorCode::PrMerged => "cannot reassign on merged PR",
            ErrorCode::NotAssigned => "reviewer is not assigned to this PR",
            ErrorCode::NoCandidate => "no active replacement candidate in team",
            ErrorCode::NotFound => "resource not found",
            ErrorCode::InternalIssue => "internal server issue, please try again",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::TeamExists("backend".into()).code(), ErrorCode::TeamExists);
        assert_eq!(Error::PrExists("pr-1".into()).code(), ErrorCode::PrExists);
        assert_eq!(Error::PrMerged("pr-1".into()).code(), ErrorCode::PrMerged);
        assert_eq!(
            Error::not_found(EntityKind::User, "u1").code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            Error::Config("bad port".into()).code(),
            ErrorCode::InternalIssue
        );
    }

    #[test]
    fn test_internal_message_keeps_operation() {
        let err = Error::internal("insert team", "connection reset");
        assert_eq!(err.code(), ErrorCode::InternalIssue);
        assert!(err.to_string().contains("insert team"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found(EntityKind::PullRequest, "pr-7");
        assert_eq!(err.to_string(), "Pull request not found: pr-7");
    }

    #[test]
    fn test_code_strings() {
        assert_eq!(ErrorCode::NoCandidate.as_str(), "NO_CANDIDATE");
        assert_eq!(ErrorCode::InternalIssue.to_string(), "INTERNAL_ISSUE");
        assert_eq!(ErrorCode::NotFound.message(), "resource not found");
    }
}
