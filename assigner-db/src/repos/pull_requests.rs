//! Pull request and review assignment repository

use std::collections::BTreeMap;

use assigner_core::error::EntityKind;
use assigner_core::store::PullRequestStore;
use assigner_core::{AssignmentStats, Error, PrStatus, PullRequest, PullRequestShort, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::is_unique_violation;

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_pull_request(self, assigned_reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            status: self.status.parse()?,
            id: self.pull_request_id,
            name: self.pull_request_name,
            author_id: self.author_id,
            created_at: self.created_at,
            merged_at: self.merged_at,
            assigned_reviewers,
        })
    }

    fn into_short(self) -> Result<PullRequestShort> {
        Ok(PullRequestShort {
            status: self.status.parse()?,
            id: self.pull_request_id,
            name: self.pull_request_name,
            author_id: self.author_id,
        })
    }
}

async fn reviewers<'e, E>(executor: E, pr_id: &str) -> Result<Vec<String>>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT reviewer_id FROM reviews WHERE pull_request_id = $1 ORDER BY reviewer_id",
    )
    .bind(pr_id)
    .fetch_all(executor)
    .await
    .map_err(|e| Error::internal("list reviewers", e))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Repository for pull requests and their reviewer assignments
#[derive(Clone)]
pub struct PullRequestsRepo {
    pool: PgPool,
}

impl PullRequestsRepo {
    /// Create a new pull requests repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PullRequestStore for PullRequestsRepo {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::internal("begin pull request transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::PrExists(pr.id.clone())
            } else {
                Error::internal("insert pull request", e)
            }
        })?;

        for reviewer_id in &pr.assigned_reviewers {
            sqlx::query(
                "INSERT INTO reviews (pull_request_id, reviewer_id, assigned_at) VALUES ($1, $2, $3)",
            )
            .bind(&pr.id)
            .bind(reviewer_id)
            .bind(pr.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::internal("insert review", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::internal("commit pull request", e))
    }

    async fn get(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("get pull request", e))?
        .ok_or_else(|| Error::not_found(EntityKind::PullRequest, pr_id))?;

        let assigned = reviewers(&self.pool, pr_id).await?;
        row.into_pull_request(assigned)
    }

    async fn mark_merged(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            UPDATE pull_requests
            SET status = $2, merged_at = COALESCE(merged_at, NOW())
            WHERE pull_request_id = $1
            RETURNING pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            "#,
        )
        .bind(pr_id)
        .bind(PrStatus::Merged.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("mark pull request merged", e))?
        .ok_or_else(|| Error::not_found(EntityKind::PullRequest, pr_id))?;

        let assigned = reviewers(&self.pool, pr_id).await?;
        row.into_pull_request(assigned)
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET reviewer_id = $3, assigned_at = NOW()
            WHERE pull_request_id = $1 AND reviewer_id = $2
            "#,
        )
        .bind(pr_id)
        .bind(old_reviewer_id)
        .bind(new_reviewer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Another writer already put the candidate on this pull request
            if is_unique_violation(&e) {
                Error::NoCandidate {
                    pr_id: pr_id.to_string(),
                    reviewer_id: old_reviewer_id.to_string(),
                }
            } else {
                Error::internal("replace reviewer", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::NotAssigned {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        Ok(())
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status,
                   pr.created_at, pr.merged_at
            FROM pull_requests pr
            INNER JOIN reviews r ON r.pull_request_id = pr.pull_request_id
            WHERE r.reviewer_id = $1
            ORDER BY pr.created_at, pr.pull_request_id
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::internal("list reviews", e))?;

        rows.into_iter().map(PullRequestRow::into_short).collect()
    }

    async fn assignment_stats(&self) -> Result<AssignmentStats> {
        let by_user: BTreeMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            "SELECT reviewer_id, COUNT(*) FROM reviews GROUP BY reviewer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::internal("count assignments by user", e))?
        .into_iter()
        .collect();

        let by_pr: BTreeMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            "SELECT pull_request_id, COUNT(*) FROM reviews GROUP BY pull_request_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::internal("count assignments by pull request", e))?
        .into_iter()
        .collect();

        Ok(AssignmentStats { by_user, by_pr })
    }
}
