//! Domain records for teams, users and pull requests

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Current time truncated to the precision the store keeps
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Caller-supplied identifier, unique across all teams
    pub id: String,

    /// Display name
    pub username: String,

    /// Owning team
    pub team_id: i64,

    /// Whether the user can be picked as a reviewer
    pub is_active: bool,

    /// Last time any field changed
    pub updated_at: DateTime<Utc>,
}

/// Member data supplied when creating a team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub id: String,
    pub username: String,
    pub is_active: bool,
}

impl NewMember {
    /// Create an active member
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Team creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub members: Vec<NewMember>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>, members: Vec<NewMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// A team with its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Surrogate id assigned by the store
    pub id: i64,

    /// Globally unique name
    pub name: String,

    pub created_at: DateTime<Utc>,

    /// Members ordered by user id
    pub members: Vec<User>,
}

/// A user together with the name of its team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithTeam {
    pub user: User,
    pub team_name: String,
}

/// Pull request status
///
/// `Open` is the initial state, `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }

    /// Whether moving to `to` is a valid transition
    ///
    /// Re-entering `Merged` is accepted so that merge stays idempotent.
    pub fn can_transition_to(&self, to: PrStatus) -> bool {
        matches!(
            (self, to),
            (PrStatus::Open, PrStatus::Merged) | (PrStatus::Merged, PrStatus::Merged)
        )
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Internal(format!(
                "unknown pull request status: {}",
                other
            ))),
        }
    }
}

/// A pull request with its current reviewers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub created_at: DateTime<Utc>,

    /// Set once, on the first merge
    pub merged_at: Option<DateTime<Utc>>,

    /// Distinct reviewer ids ordered by id, never including the author
    pub assigned_reviewers: Vec<String>,
}

impl PullRequest {
    /// Create an open pull request with the given reviewers
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
        mut assigned_reviewers: Vec<String>,
    ) -> Self {
        assigned_reviewers.sort();
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            created_at: now(),
            merged_at: None,
            assigned_reviewers,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if `user_id` is currently a reviewer
    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Swap `old` for `new` in the reviewer list, keeping it ordered
    ///
    /// Returns false when `old` is not assigned.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        match self.assigned_reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                self.assigned_reviewers.sort();
                true
            }
            None => false,
        }
    }

    /// Mark the pull request merged, keeping the first merge time
    pub fn merge(&mut self) {
        self.status = PrStatus::Merged;
        if self.merged_at.is_none() {
            self.merged_at = Some(now());
        }
    }
}

/// Summary of a pull request used in reviewer listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestShort {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
}

impl From<&PullRequest> for PullRequestShort {
    fn from(pr: &PullRequest) -> Self {
        Self {
            id: pr.id.clone(),
            name: pr.name.clone(),
            author_id: pr.author_id.clone(),
            status: pr.status,
        }
    }
}

/// Current assignment counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentStats {
    /// Number of pull requests each reviewer is assigned to
    pub by_user: BTreeMap<String, i64>,

    /// Number of reviewers assigned to each pull request
    pub by_pr: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(PrStatus::Open.can_transition_to(PrStatus::Merged));
        assert!(PrStatus::Merged.can_transition_to(PrStatus::Merged));
        assert!(!PrStatus::Merged.can_transition_to(PrStatus::Open));
        assert!(!PrStatus::Open.can_transition_to(PrStatus::Open));
        assert!(PrStatus::Merged.is_terminal());
        assert!(!PrStatus::Open.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("OPEN".parse::<PrStatus>().unwrap(), PrStatus::Open);
        assert_eq!("MERGED".parse::<PrStatus>().unwrap(), PrStatus::Merged);
        assert!("merged".parse::<PrStatus>().is_err());
    }

    #[test]
    fn test_merge_keeps_first_timestamp() {
        let mut pr = PullRequest::new("pr-1", "Add search", "alice", vec!["bob".into()]);
        assert!(!pr.is_merged());

        pr.merge();
        let first = pr.merged_at;
        assert!(first.is_some());

        pr.merge();
        assert!(pr.is_merged());
        assert_eq!(pr.merged_at, first);
    }

    #[test]
    fn test_has_reviewer() {
        let pr = PullRequest::new(
            "pr-1",
            "Add search",
            "alice",
            vec!["bob".into(), "carol".into()],
        );
        assert!(pr.has_reviewer("bob"));
        assert!(!pr.has_reviewer("alice"));
    }

    #[test]
    fn test_reviewers_stay_ordered() {
        let mut pr = PullRequest::new(
            "pr-1",
            "Add search",
            "alice",
            vec!["dave".into(), "bob".into()],
        );
        assert_eq!(pr.assigned_reviewers, vec!["bob", "dave"]);

        assert!(pr.replace_reviewer("dave", "carol"));
        assert_eq!(pr.assigned_reviewers, vec!["bob", "carol"]);

        assert!(pr.replace_reviewer("bob", "erin"));
        assert_eq!(pr.assigned_reviewers, vec!["carol", "erin"]);

        assert!(!pr.replace_reviewer("zed", "frank"));
    }

    #[test]
    fn test_short_from_pull_request() {
        let pr = PullRequest::new("pr-1", "Add search", "alice", Vec::new());
        let short = PullRequestShort::from(&pr);
        assert_eq!(short.id, "pr-1");
        assert_eq!(short.author_id, "alice");
        assert_eq!(short.status, PrStatus::Open);
    }
}
