//! Pull request lifecycle: creation with reviewer assignment, merge and
//! reviewer reassignment.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{AssignmentStats, PullRequest, User};
use crate::selector::{ReviewerSelector, MAX_REVIEWER_QUOTA};
use crate::store::{PullRequestStore, UserStore};
use crate::{Error, Result};

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// Pull request as stored after the swap
    pub pull_request: PullRequest,

    /// Id of the reviewer that took the slot
    pub replaced_by: String,
}

/// Service managing pull requests and their reviewers
pub struct PullRequestService {
    users: Arc<dyn UserStore>,
    pull_requests: Arc<dyn PullRequestStore>,
    selector: ReviewerSelector,
    reviewer_quota: usize,
}

impl PullRequestService {
    /// Create the service
    ///
    /// `reviewer_quota` is capped at [`MAX_REVIEWER_QUOTA`].
    pub fn new(
        users: Arc<dyn UserStore>,
        pull_requests: Arc<dyn PullRequestStore>,
        selector: ReviewerSelector,
        reviewer_quota: usize,
    ) -> Self {
        if reviewer_quota > MAX_REVIEWER_QUOTA {
            warn!(
                requested = reviewer_quota,
                max = MAX_REVIEWER_QUOTA,
                "Reviewer quota capped"
            );
        }

        Self {
            users,
            pull_requests,
            selector,
            reviewer_quota: reviewer_quota.min(MAX_REVIEWER_QUOTA),
        }
    }

    /// Create a pull request and assign reviewers from the author's team
    ///
    /// Reviewers are drawn from active teammates other than the author. A
    /// small team yields fewer reviewers, possibly none.
    pub async fn create_pr(&self, pr_id: &str, name: &str, author_id: &str) -> Result<PullRequest> {
        let author = self.users.get(author_id).await?;
        let teammates = self
            .users
            .active_teammates(author.team_id, &author.id)
            .await?;

        let picked = self
            .selector
            .pick_reviewers(&teammates, self.reviewer_quota)
            .map_err(|e| Error::internal("pick reviewers", e))?;

        let pr = PullRequest::new(
            pr_id,
            name,
            author_id,
            picked.into_iter().map(|u| u.id).collect(),
        );
        self.pull_requests.create(&pr).await?;

        info!(
            pr_id,
            author_id,
            reviewers = ?pr.assigned_reviewers,
            "Pull request created"
        );
        Ok(pr)
    }

    /// Merge a pull request
    ///
    /// Merging twice succeeds and keeps the first merge time.
    pub async fn merge(&self, pr_id: &str) -> Result<PullRequest> {
        let pr = self.pull_requests.mark_merged(pr_id).await?;
        info!(pr_id, merged_at = ?pr.merged_at, "Pull request merged");
        Ok(pr)
    }

    /// Replace `old_reviewer_id` with a random eligible teammate
    ///
    /// The candidate pool is the old reviewer's active teammates minus the
    /// author and every reviewer currently on the pull request. The final
    /// conditional swap is the only serialization point: a concurrent call
    /// that already moved the slot makes this one fail with `NotAssigned`.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        let pr = self.pull_requests.get(pr_id).await?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pr.id));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(Error::NotAssigned {
                pr_id: pr.id,
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let old_reviewer = self.users.get(old_reviewer_id).await?;
        let teammates = self
            .users
            .active_teammates(old_reviewer.team_id, old_reviewer_id)
            .await?;

        let candidates: Vec<User> = teammates
            .into_iter()
            .filter(|u| u.id != pr.author_id && !pr.has_reviewer(&u.id))
            .collect();

        if candidates.is_empty() {
            warn!(pr_id, old_reviewer_id, "No replacement candidate");
            return Err(Error::NoCandidate {
                pr_id: pr.id,
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let replacement = self
            .selector
            .pick_one(&candidates)
            .map_err(|e| Error::internal("pick replacement reviewer", e))?;

        self.pull_requests
            .replace_reviewer(pr_id, old_reviewer_id, &replacement.id)
            .await?;

        let updated = self.pull_requests.get(pr_id).await?;

        info!(
            pr_id,
            old_reviewer_id,
            new_reviewer_id = %replacement.id,
            "Reviewer reassigned"
        );
        Ok(Reassignment {
            pull_request: updated,
            replaced_by: replacement.id,
        })
    }

    /// Count current assignments per reviewer and per pull request
    pub async fn assignment_stats(&self) -> Result<AssignmentStats> {
        self.pull_requests.assignment_stats().await
    }
}
