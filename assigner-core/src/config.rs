//! Configuration management for the assigner
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SERVER_ADDR, DB_*)
//! 3. Config file (~/.config/assigner/config.toml)
//! 4. Default values

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::selector::{DEFAULT_REVIEWER_QUOTA, MAX_REVIEWER_QUOTA};
use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address; `:8080` binds all interfaces
    pub addr: String,

    /// Upper bound on the lifetime of a single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// How long shutdown waits for in-flight requests
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: ":8080".to_string(),
            request_timeout: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(15),
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        };

        addr.parse()
            .map_err(|e| Error::Config(format!("Invalid server address {:?}: {}", self.addr, e)))
    }
}

/// PostgreSQL SSL mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// No encryption
    #[default]
    Disable,
    /// Encrypted, server certificate not verified
    Require,
    /// Encrypted, server certificate and host verified
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Require => "require",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "disable" => Ok(SslMode::Disable),
            "require" => Ok(SslMode::Require),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(Error::Config(format!("Unknown SSL mode: {}", other))),
        }
    }
}

/// Connection pool bounds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,

    /// Connections kept open while idle
    pub min_connections: u32,

    #[serde(with = "humantime_serde")]
    pub max_lifetime: Duration,

    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// Interval between background pool pings
    #[serde(with = "humantime_serde")]
    pub health_check_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(5 * 60),
            health_check_interval: Duration::from_secs(60),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,

    /// Database name
    pub name: String,

    pub ssl_mode: SslMode,

    pub pool: PoolConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "assigner".to_string(),
            password: "assigner".to_string(),
            name: "assigner".to_string(),
            ssl_mode: SslMode::Disable,
            pool: PoolConfig::default(),
        }
    }
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Reviewers assigned to each new pull request
    pub reviewer_quota: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            reviewer_quota: DEFAULT_REVIEWER_QUOTA,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub assignment: AssignmentConfig,
}

impl Config {
    /// Load configuration from `path`, or the default location
    ///
    /// Returns default config if the file doesn't exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/assigner/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("assigner").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SERVER_ADDR: HTTP listen address
    /// - DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME: connection settings
    /// - DB_SSLMODE: disable, require or verify-full
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(addr) = var("SERVER_ADDR") {
            self.server.addr = addr;
        }
        if let Some(host) = var("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = var("DB_PORT") {
            self.database.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid DB_PORT {:?}: {}", port, e)))?;
        }
        if let Some(user) = var("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = var("DB_NAME") {
            self.database.name = name;
        }
        if let Some(mode) = var("DB_SSLMODE") {
            self.database.ssl_mode = mode.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %mode,
                    default = %SslMode::Disable,
                    "Invalid DB_SSLMODE, using default"
                );
                SslMode::Disable
            });
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, addr: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.server.addr = addr;
        }

        self
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.assignment.reviewer_quota > MAX_REVIEWER_QUOTA {
            return Err(Error::Config(format!(
                "reviewer_quota {} exceeds the maximum of {}",
                self.assignment.reviewer_quota, MAX_REVIEWER_QUOTA
            )));
        }

        let pool = &self.database.pool;
        if pool.max_connections == 0 {
            return Err(Error::Config("max_connections must be positive".to_string()));
        }
        if pool.min_connections > pool.max_connections {
            return Err(Error::Config(format!(
                "min_connections {} exceeds max_connections {}",
                pool.min_connections, pool.max_connections
            )));
        }

        for (name, value) in [
            ("health_check_interval", pool.health_check_interval),
            ("request_timeout", self.server.request_timeout),
        ] {
            if value.is_zero() {
                return Err(Error::Config(format!("{} must be positive", name)));
            }
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, addr: Option<String>) -> Result<Self> {
        let config = Self::load(path)?
            .with_env_overrides()?
            .with_cli_overrides(addr);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.addr, ":8080");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.ssl_mode, SslMode::Disable);
        assert_eq!(config.database.pool.max_connections, 25);
        assert_eq!(config.database.pool.min_connections, 5);
        assert_eq!(config.database.pool.max_lifetime, Duration::from_secs(1800));
        assert_eq!(config.assignment.reviewer_quota, 2);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides_from(lookup(&[
                ("SERVER_ADDR", "127.0.0.1:9000"),
                ("DB_HOST", "db.internal"),
                ("DB_PORT", "6543"),
                ("DB_SSLMODE", "verify-full"),
                ("DB_NAME", ""),
            ]))
            .unwrap();

        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.ssl_mode, SslMode::VerifyFull);
        // Empty values fall back
        assert_eq!(config.database.name, "assigner");
    }

    #[test]
    fn test_invalid_port_is_error() {
        let result = Config::default().with_overrides_from(lookup(&[("DB_PORT", "five")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_ssl_mode_falls_back() {
        let config = Config::default()
            .with_overrides_from(lookup(&[("DB_SSLMODE", "prefer")]))
            .unwrap();
        assert_eq!(config.database.ssl_mode, SslMode::Disable);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(Some(":9090".to_string()));
        assert_eq!(config.server.addr, ":9090");
    }

    #[test]
    fn test_socket_addr() {
        let mut server = ServerConfig::default();
        assert_eq!(
            server.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );

        server.addr = "127.0.0.1:3000".to_string();
        assert_eq!(server.socket_addr().unwrap().port(), 3000);

        server.addr = "not an address".to_string();
        assert!(server.socket_addr().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
addr = ":9999"
shutdown_grace = "30s"

[database]
host = "pg"
ssl_mode = "require"

[database.pool]
max_connections = 10
idle_timeout = "2m"

[assignment]
reviewer_quota = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.addr, ":9999");
        assert_eq!(config.server.shutdown_grace, Duration::from_secs(30));
        assert_eq!(config.server.request_timeout, Duration::from_secs(10));
        assert_eq!(config.database.host, "pg");
        assert_eq!(config.database.ssl_mode, SslMode::Require);
        assert_eq!(config.database.pool.max_connections, 10);
        assert_eq!(config.database.pool.idle_timeout, Duration::from_secs(120));
        assert_eq!(config.database.pool.min_connections, 5);
        assert_eq!(config.assignment.reviewer_quota, 1);
    }

    #[test]
    fn test_validate_rejects_large_quota() {
        let config: Config = toml::from_str("[assignment]\nreviewer_quota = 4\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config: Config = toml::from_str("[assignment]\nreviewer_quota = 1\n").unwrap();
        assert!(config.validate().is_ok());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_health_interval() {
        let config: Config =
            toml::from_str("[database.pool]\nhealth_check_interval = \"0s\"\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_pool_bounds() {
        let config: Config =
            toml::from_str("[database.pool]\nmax_connections = 3\nmin_connections = 5\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_with_overrides_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[assignment]\nreviewer_quota = 3\n").unwrap();

        let result = Config::load_with_overrides(Some(&path), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\nport = 15432\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database.port, 15432);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.database.port, 5432);
    }
}
