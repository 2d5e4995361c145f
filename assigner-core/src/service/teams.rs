//! Team management

use std::sync::Arc;

use tracing::info;

use crate::models::{NewTeam, Team};
use crate::store::TeamStore;
use crate::Result;

/// Service for creating and looking up teams
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }

    /// Create a team, upserting its members
    ///
    /// Members that already exist are moved to the new team with the
    /// supplied name and active flag.
    pub async fn create_team(&self, team: NewTeam) -> Result<Team> {
        let created = self.teams.create(team).await?;
        info!(
            team_name = %created.name,
            team_id = created.id,
            members = created.members.len(),
            "Team created"
        );
        Ok(created)
    }

    pub async fn get_team(&self, name: &str) -> Result<Team> {
        self.teams.get_by_name(name).await
    }

    pub async fn get_team_by_id(&self, id: i64) -> Result<Team> {
        self.teams.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::NewMember;
    use crate::store::InMemoryStore;

    fn service() -> TeamService {
        TeamService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let service = service();
        let created = service
            .create_team(NewTeam::new(
                "payments",
                vec![
                    NewMember::new("u1", "Alice"),
                    NewMember::new("u2", "Bob").with_active(false),
                ],
            ))
            .await
            .unwrap();

        let fetched = service.get_team("payments").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.members.len(), 2);
        assert!(!fetched.members[1].is_active);

        let by_id = service.get_team_by_id(created.id).await.unwrap();
        assert_eq!(by_id.name, "payments");
    }

    #[tokio::test]
    async fn test_duplicate_team() {
        let service = service();
        service
            .create_team(NewTeam::new("payments", vec![NewMember::new("u1", "Alice")]))
            .await
            .unwrap();

        let result = service
            .create_team(NewTeam::new("payments", vec![NewMember::new("u2", "Bob")]))
            .await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::TeamExists);

        // The rejected batch left no member behind
        let team = service.get_team("payments").await.unwrap();
        assert_eq!(team.members.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_team() {
        let service = service();
        assert_eq!(
            service.get_team("ghosts").await.unwrap_err().code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            service.get_team_by_id(99).await.unwrap_err().code(),
            ErrorCode::NotFound
        );
    }
}
