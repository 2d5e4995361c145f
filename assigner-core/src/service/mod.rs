//! Business services built on the store traits
//!
//! Services validate state, call the selector and classify every failure
//! before it reaches the caller.

pub mod pull_requests;
pub mod teams;
pub mod users;

use std::sync::Arc;

pub use pull_requests::{PullRequestService, Reassignment};
pub use teams::TeamService;
pub use users::UserService;

use crate::config::AssignmentConfig;
use crate::selector::ReviewerSelector;
use crate::store::{PullRequestStore, TeamStore, UserStore};

/// All services wired to one set of stores
#[derive(Clone)]
pub struct Services {
    pub teams: Arc<TeamService>,
    pub users: Arc<UserService>,
    pub pull_requests: Arc<PullRequestService>,
}

impl Services {
    /// Wire services to separate store capabilities
    pub fn new(
        teams: Arc<dyn TeamStore>,
        users: Arc<dyn UserStore>,
        pull_requests: Arc<dyn PullRequestStore>,
        selector: ReviewerSelector,
        assignment: &AssignmentConfig,
    ) -> Self {
        Self {
            teams: Arc::new(TeamService::new(teams.clone())),
            users: Arc::new(UserService::new(
                users.clone(),
                teams,
                pull_requests.clone(),
            )),
            pull_requests: Arc::new(PullRequestService::new(
                users,
                pull_requests,
                selector,
                assignment.reviewer_quota,
            )),
        }
    }

    /// Wire services to a backend that implements every capability
    pub fn from_store<S>(store: Arc<S>, selector: ReviewerSelector, assignment: &AssignmentConfig) -> Self
    where
        S: TeamStore + UserStore + PullRequestStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store, selector, assignment)
    }
}
