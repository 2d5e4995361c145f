//! In-memory implementation of the store traits.
//!
//! All tables sit behind one `RwLock`, so every write is atomic with
//! respect to readers. State is lost on restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PullRequestStore, TeamStore, UserStore};
use crate::error::EntityKind;
use crate::models::{
    now, AssignmentStats, NewTeam, PrStatus, PullRequest, PullRequestShort, Team, User,
};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct TeamRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    last_team_id: i64,
    teams: BTreeMap<i64, TeamRow>,
    team_ids_by_name: HashMap<String, i64>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

impl Tables {
    fn team(&self, id: i64) -> Option<Team> {
        let row = self.teams.get(&id)?;
        let members = self
            .users
            .values()
            .filter(|u| u.team_id == id)
            .cloned()
            .collect();

        Some(Team {
            id: row.id,
            name: row.name.clone(),
            created_at: row.created_at,
            members,
        })
    }
}

/// Store that keeps every table in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn create(&self, team: NewTeam) -> Result<Team> {
        let mut tables = self.tables.write().await;

        if tables.team_ids_by_name.contains_key(&team.name) {
            return Err(Error::TeamExists(team.name));
        }

        tables.last_team_id += 1;
        let id = tables.last_team_id;
        let created_at = now();

        tables.teams.insert(
            id,
            TeamRow {
                id,
                name: team.name.clone(),
                created_at,
            },
        );
        tables.team_ids_by_name.insert(team.name.clone(), id);

        for member in team.members {
            tables.users.insert(
                member.id.clone(),
                User {
                    id: member.id,
                    username: member.username,
                    team_id: id,
                    is_active: member.is_active,
                    updated_at: created_at,
                },
            );
        }

        tables
            .team(id)
            .ok_or_else(|| Error::internal("create team", "team vanished after insert"))
    }

    async fn get_by_name(&self, name: &str) -> Result<Team> {
        let tables = self.tables.read().await;
        tables
            .team_ids_by_name
            .get(name)
            .and_then(|id| tables.team(*id))
            .ok_or_else(|| Error::not_found(EntityKind::Team, name))
    }

    async fn get_by_id(&self, id: i64) -> Result<Team> {
        let tables = self.tables.read().await;
        tables
            .team(id)
            .ok_or_else(|| Error::not_found(EntityKind::Team, id.to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get(&self, user_id: &str) -> Result<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::not_found(EntityKind::User, user_id))
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.contains_key(user_id))
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::not_found(EntityKind::User, user_id))?;

        user.is_active = is_active;
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn active_teammates(&self, team_id: i64, exclude_user_id: &str) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.team_id == team_id && u.is_active && u.id != exclude_user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.write().await;

        if tables.pull_requests.contains_key(&pr.id) {
            return Err(Error::PrExists(pr.id.clone()));
        }

        tables.pull_requests.insert(pr.id.clone(), pr.clone());

        Ok(())
    }

    async fn get(&self, pr_id: &str) -> Result<PullRequest> {
        let tables = self.tables.read().await;
        tables
            .pull_requests
            .get(pr_id)
            .cloned()
            .ok_or_else(|| Error::not_found(EntityKind::PullRequest, pr_id))
    }

    async fn mark_merged(&self, pr_id: &str) -> Result<PullRequest> {
        let mut tables = self.tables.write().await;
        let pr = tables
            .pull_requests
            .get_mut(pr_id)
            .ok_or_else(|| Error::not_found(EntityKind::PullRequest, pr_id))?;

        if !pr.status.can_transition_to(PrStatus::Merged) {
            return Err(Error::internal(
                "mark pull request merged",
                format!("invalid transition from {}", pr.status),
            ));
        }

        pr.merge();
        Ok(pr.clone())
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let not_assigned = || Error::NotAssigned {
            pr_id: pr_id.to_string(),
            reviewer_id: old_reviewer_id.to_string(),
        };

        let pr = tables
            .pull_requests
            .get_mut(pr_id)
            .ok_or_else(not_assigned)?;

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(not_assigned());
        }

        // Mirrors the (pull_request_id, reviewer_id) unique key.
        if pr.has_reviewer(new_reviewer_id) {
            return Err(Error::NoCandidate {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        pr.replace_reviewer(old_reviewer_id, new_reviewer_id);
        Ok(())
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let tables = self.tables.read().await;
        let mut prs: Vec<&PullRequest> = tables
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(reviewer_id))
            .collect();
        prs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(prs
            .into_iter()
            .map(PullRequestShort::from)
            .collect())
    }

    async fn assignment_stats(&self) -> Result<AssignmentStats> {
        let tables = self.tables.read().await;
        let mut stats = AssignmentStats::default();

        for pr in tables.pull_requests.values() {
            for reviewer_id in &pr.assigned_reviewers {
                *stats.by_user.entry(reviewer_id.clone()).or_default() += 1;
                *stats.by_pr.entry(pr.id.clone()).or_default() += 1;
            }
        }

        Ok(stats)
    }
}
