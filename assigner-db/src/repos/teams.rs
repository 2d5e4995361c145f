//! Team repository

use assigner_core::error::EntityKind;
use assigner_core::store::TeamStore;
use assigner_core::{Error, NewTeam, Result, Team};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::is_unique_violation;
use super::users::team_members;

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: i64,
    team_name: String,
    created_at: DateTime<Utc>,
}

/// Repository for teams and their membership
#[derive(Clone)]
pub struct TeamsRepo {
    pool: PgPool,
}

impl TeamsRepo {
    /// Create a new teams repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_members(&self, row: TeamRow) -> Result<Team> {
        let members = team_members(&self.pool, row.id).await?;
        Ok(Team {
            id: row.id,
            name: row.team_name,
            created_at: row.created_at,
            members,
        })
    }
}

#[async_trait]
impl TeamStore for TeamsRepo {
    async fn create(&self, team: NewTeam) -> Result<Team> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::internal("begin team transaction", e))?;

        let row = sqlx::query_as::<_, TeamRow>(
            "INSERT INTO teams (team_name) VALUES ($1) RETURNING id, team_name, created_at",
        )
        .bind(&team.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::TeamExists(team.name.clone())
            } else {
                Error::internal("insert team", e)
            }
        })?;

        // Existing users move to the new team
        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_id, is_active, updated_at)
                VALUES ($1, $2, $3, $4, NOW())
                ON CONFLICT (user_id) DO UPDATE SET
                    username = EXCLUDED.username,
                    team_id = EXCLUDED.team_id,
                    is_active = EXCLUDED.is_active,
                    updated_at = NOW()
                "#,
            )
            .bind(&member.id)
            .bind(&member.username)
            .bind(row.id)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::internal("upsert team member", e))?;
        }

        let members = team_members(&mut *tx, row.id).await?;

        tx.commit()
            .await
            .map_err(|e| Error::internal("commit team", e))?;

        tracing::debug!(team_id = row.id, team_name = %row.team_name, members = members.len(), "Team stored");

        Ok(Team {
            id: row.id,
            name: row.team_name,
            created_at: row.created_at,
            members,
        })
    }

    async fn get_by_name(&self, name: &str) -> Result<Team> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, team_name, created_at FROM teams WHERE team_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("get team by name", e))?
        .ok_or_else(|| Error::not_found(EntityKind::Team, name))?;

        self.with_members(row).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Team> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, team_name, created_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("get team by id", e))?
        .ok_or_else(|| Error::not_found(EntityKind::Team, id.to_string()))?;

        self.with_members(row).await
    }
}
