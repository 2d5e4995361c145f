//! Storage capabilities consumed by the services
//!
//! Each entity kind has its own narrow trait so services only depend on
//! what they use and backends can be swapped or faked per component.
//! Implementations classify every failure into [`crate::Error`] before
//! returning it.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::models::{AssignmentStats, NewTeam, PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// Team persistence
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Insert the team and upsert its members in one atomic unit
    ///
    /// Fails with `TeamExists` when the name is taken.
    async fn create(&self, team: NewTeam) -> Result<Team>;

    /// Get a team and its members by name
    async fn get_by_name(&self, name: &str) -> Result<Team>;

    /// Get a team and its members by id
    async fn get_by_id(&self, id: i64) -> Result<Team>;
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<User>;

    async fn exists(&self, user_id: &str) -> Result<bool>;

    /// Set the active flag and refresh `updated_at`
    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User>;

    /// Active members of `team_id` other than `exclude_user_id`, ordered by id
    async fn active_teammates(&self, team_id: i64, exclude_user_id: &str) -> Result<Vec<User>>;
}

/// Pull request and reviewer assignment persistence
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert the pull request and its assignment rows in one atomic unit
    ///
    /// Fails with `PrExists` when the id is taken.
    async fn create(&self, pr: &PullRequest) -> Result<()>;

    async fn get(&self, pr_id: &str) -> Result<PullRequest>;

    /// Set status to merged, keeping any existing merge time
    async fn mark_merged(&self, pr_id: &str) -> Result<PullRequest>;

    /// Swap one assignment row from `old_reviewer_id` to `new_reviewer_id`
    ///
    /// Fails with `NotAssigned` when no row matches `old_reviewer_id`.
    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()>;

    /// Pull requests where the user is currently a reviewer
    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>>;

    async fn assignment_stats(&self) -> Result<AssignmentStats>;
}
