//! PostgreSQL store for the reviewer assigner
//!
//! Provides the connection pool, embedded migrations and repositories that
//! implement the `assigner-core` store traits.

pub mod error;
pub mod health;
pub mod repos;

use assigner_core::config::{DatabaseConfig, SslMode};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;
use std::str::FromStr;

pub use error::{DbError, Result};
pub use health::spawn_health_check;
pub use repos::{PullRequestsRepo, TeamsRepo, UsersRepo};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect using the configured host, credentials and pool bounds
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .ssl_mode(ssl_mode(config.ssl_mode))
            .disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .max_lifetime(config.pool.max_lifetime)
            .idle_timeout(config.pool.idle_timeout)
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            ssl_mode = %config.ssl_mode,
            max_connections = config.pool.max_connections,
            "Database pool created"
        );

        Ok(Self { pool })
    }

    /// Connect from a `postgres://` URL
    pub async fn connect_url(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url)?.disable_statement_logging();
        let pool = PgPoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))
    }

    /// Round-trip a trivial query to check the pool is healthy
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get the teams repository
    pub fn teams(&self) -> TeamsRepo {
        TeamsRepo::new(self.pool.clone())
    }

    /// Get the users repository
    pub fn users(&self) -> UsersRepo {
        UsersRepo::new(self.pool.clone())
    }

    /// Get the pull requests repository
    pub fn pull_requests(&self) -> PullRequestsRepo {
        PullRequestsRepo::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_mapping() {
        assert!(matches!(ssl_mode(SslMode::Disable), PgSslMode::Disable));
        assert!(matches!(ssl_mode(SslMode::Require), PgSslMode::Require));
        assert!(matches!(ssl_mode(SslMode::VerifyFull), PgSslMode::VerifyFull));
    }

    #[tokio::test]
    async fn test_connect_url_rejects_garbage() {
        assert!(Database::connect_url("not a url").await.is_err());
    }
}
