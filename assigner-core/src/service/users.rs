//! User activity and review listings

use std::sync::Arc;

use tracing::info;

use crate::error::EntityKind;
use crate::models::{PullRequestShort, UserWithTeam};
use crate::store::{PullRequestStore, TeamStore, UserStore};
use crate::{Error, Result};

/// Service for user-facing operations
pub struct UserService {
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    pull_requests: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        teams: Arc<dyn TeamStore>,
        pull_requests: Arc<dyn PullRequestStore>,
    ) -> Self {
        Self {
            users,
            teams,
            pull_requests,
        }
    }

    /// Toggle whether the user can be picked as a reviewer
    ///
    /// Existing assignments are left untouched.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<UserWithTeam> {
        let user = self.users.set_active(user_id, is_active).await?;
        let team = self.teams.get_by_id(user.team_id).await?;

        info!(user_id, is_active, team_name = %team.name, "User activity changed");
        Ok(UserWithTeam {
            user,
            team_name: team.name,
        })
    }

    /// Pull requests where the user is currently a reviewer
    pub async fn reviews(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        if !self.users.exists(user_id).await? {
            return Err(Error::not_found(EntityKind::User, user_id));
        }

        self.pull_requests.list_by_reviewer(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::{NewMember, NewTeam, PrStatus, PullRequest};
    use crate::store::InMemoryStore;

    async fn setup() -> (Arc<InMemoryStore>, UserService) {
        let store = Arc::new(InMemoryStore::new());
        TeamStore::create(
            store.as_ref(),
            NewTeam::new(
                "core",
                vec![NewMember::new("alice", "Alice"), NewMember::new("bob", "Bob")],
            ),
        )
        .await
        .unwrap();

        let service = UserService::new(store.clone(), store.clone(), store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_set_active() {
        let (store, service) = setup().await;
        let before = UserStore::get(store.as_ref(), "bob").await.unwrap();

        let detail = service.set_active("bob", false).await.unwrap();
        assert!(!detail.user.is_active);
        assert_eq!(detail.team_name, "core");
        assert!(detail.user.updated_at >= before.updated_at);

        let mates = store
            .active_teammates(detail.user.team_id, "alice")
            .await
            .unwrap();
        assert!(mates.is_empty());
    }

    #[tokio::test]
    async fn test_set_active_unknown_user() {
        let (_, service) = setup().await;
        let result = service.set_active("ghost", true).await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_reviews() {
        let (store, service) = setup().await;
        PullRequestStore::create(
            store.as_ref(),
            &PullRequest::new("pr-1", "Add cache", "alice", vec!["bob".into()]),
        )
        .await
        .unwrap();

        let reviews = service.reviews("bob").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, "pr-1");
        assert_eq!(reviews[0].status, PrStatus::Open);

        assert!(service.reviews("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reviews_unknown_user() {
        let (_, service) = setup().await;
        let result = service.reviews("ghost").await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::NotFound);
    }
}
