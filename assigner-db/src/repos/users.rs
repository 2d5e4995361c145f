//! User repository

use assigner_core::error::EntityKind;
use assigner_core::store::UserStore;
use assigner_core::{Error, Result, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

/// Row shape of the `users` table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    user_id: String,
    username: String,
    team_id: i64,
    is_active: bool,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            username: row.username,
            team_id: row.team_id,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

/// All members of a team ordered by user id
pub(crate) async fn team_members<'e, E>(executor: E, team_id: i64) -> Result<Vec<User>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, team_id, is_active, updated_at
        FROM users
        WHERE team_id = $1
        ORDER BY user_id
        "#,
    )
    .bind(team_id)
    .fetch_all(executor)
    .await
    .map_err(|e| Error::internal("list team members", e))?;

    Ok(rows.into_iter().map(User::from).collect())
}

/// Repository for user records
#[derive(Clone)]
pub struct UsersRepo {
    pool: PgPool,
}

impl UsersRepo {
    /// Create a new users repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepo {
    async fn get(&self, user_id: &str) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_id, is_active, updated_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("get user", e))?
        .map(User::from)
        .ok_or_else(|| Error::not_found(EntityKind::User, user_id))
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Error::internal("check user exists", e))?;
        Ok(exists)
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, username, team_id, is_active, updated_at
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::internal("set user active", e))?
        .map(User::from)
        .ok_or_else(|| Error::not_found(EntityKind::User, user_id))
    }

    async fn active_teammates(&self, team_id: i64, exclude_user_id: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, team_id, is_active, updated_at
            FROM users
            WHERE team_id = $1 AND is_active AND user_id <> $2
            ORDER BY user_id
            "#,
        )
        .bind(team_id)
        .bind(exclude_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::internal("list active teammates", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
