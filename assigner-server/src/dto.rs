//! Wire types for the HTTP API

use std::collections::BTreeMap;

use assigner_core::{
    AssignmentStats, NewMember, NewTeam, PrStatus, PullRequest, PullRequestShort, Reassignment,
    Team, User, UserWithTeam,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team member as sent and received on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
        }
    }
}

/// Body of `POST /team/add` and result of `GET /team/get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDto {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamDto {
    /// Whether the request names a team and carries at least one member
    pub fn is_valid(&self) -> bool {
        !self.team_name.is_empty() && !self.members.is_empty()
    }
}

impl From<TeamDto> for NewTeam {
    fn from(dto: TeamDto) -> Self {
        NewTeam::new(
            dto.team_name,
            dto.members
                .into_iter()
                .map(|m| NewMember::new(m.user_id, m.username).with_active(m.is_active))
                .collect(),
        )
    }
}

impl From<&Team> for TeamDto {
    fn from(team: &Team) -> Self {
        Self {
            team_name: team.name.clone(),
            members: team.members.iter().map(TeamMember::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: TeamDto,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

/// User with the name of its team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserWithTeam> for UserDetail {
    fn from(detail: UserWithTeam) -> Self {
        Self {
            user_id: detail.user.id,
            username: detail.user.username,
            team_name: detail.team_name,
            is_active: detail.user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDetail,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePrRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
}

/// Full pull request representation
///
/// Timestamps keep their historical camelCase names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestDto,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

impl From<Reassignment> for ReassignResponse {
    fn from(outcome: Reassignment) -> Self {
        Self {
            pr: outcome.pull_request.into(),
            replaced_by: outcome.replaced_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShortDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
}

impl From<PullRequestShort> for PullRequestShortDto {
    fn from(pr: PullRequestShort) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortDto>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentStatsResponse {
    pub assignments_by_user: BTreeMap<String, i64>,
    pub assignments_by_pr: BTreeMap<String, i64>,
}

impl From<AssignmentStats> for AssignmentStatsResponse {
    fn from(stats: AssignmentStats) -> Self {
        Self {
            assignments_by_user: stats.by_user,
            assignments_by_pr: stats.by_pr,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pull_request_omits_unset_merge_time() {
        let pr = PullRequest::new("pr-1", "Add cache", "alice", vec!["bob".into()]);
        let value = serde_json::to_value(PullRequestDto::from(pr)).unwrap();

        assert_eq!(value["status"], "OPEN");
        assert_eq!(value["assigned_reviewers"], json!(["bob"]));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("mergedAt").is_none());
    }

    #[test]
    fn test_pull_request_includes_merge_time() {
        let mut pr = PullRequest::new("pr-1", "Add cache", "alice", Vec::new());
        pr.merge();
        let value = serde_json::to_value(PullRequestDto::from(pr)).unwrap();

        assert_eq!(value["status"], "MERGED");
        assert!(value["mergedAt"].is_string());
    }

    #[test]
    fn test_team_validation() {
        let team: TeamDto = serde_json::from_value(json!({
            "team_name": "core",
            "members": [{"user_id": "u1", "username": "Alice", "is_active": true}]
        }))
        .unwrap();
        assert!(team.is_valid());

        let empty = TeamDto {
            team_name: "core".into(),
            members: Vec::new(),
        };
        assert!(!empty.is_valid());
    }

    #[test]
    fn test_team_into_new_team_keeps_active_flag() {
        let dto = TeamDto {
            team_name: "core".into(),
            members: vec![TeamMember {
                user_id: "u1".into(),
                username: "Alice".into(),
                is_active: false,
            }],
        };
        let team = NewTeam::from(dto);
        assert_eq!(team.name, "core");
        assert!(!team.members[0].is_active);
    }
}
