//! Backend connection configuration

use crate::{DbError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[cfg(test)]
mod tests;

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

/// Connection parameters for the backend server.
///
/// Immutable once a pool has been built from it; `Pool::reconfigure` swaps
/// the whole record. The `Debug` impl masks the password so the record can
/// be logged safely.
#[derive(Clone, Deserialize)]
pub struct DbConfig {
    /// Server hostname or IP address
    pub host: String,
    /// Username
    pub user: String,
    /// Password. Never logged; masked in `Debug` output.
    pub password: String,
    /// Database name (empty string selects no database)
    pub database: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection character set
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout", rename = "connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Keys that must be present in a config file
const REQUIRED_KEYS: &[&str] = &["host", "user", "password", "database"];

impl DbConfig {
    /// Create a configuration with default port, charset, and timeout
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port: default_port(),
            charset: default_charset(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Set the server port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection character set
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the connect timeout in seconds
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Get the connect timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Load configuration from a JSON file.
    ///
    /// The file must contain `host`, `user`, `password`, and `database`;
    /// a missing key fails with `DbError::Config` before any pool is built.
    /// `port`, `charset`, and `connect_timeout` fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration file");

        let content = std::fs::read_to_string(path)?;
        let raw: serde_json::Value = serde_json::from_str(&content)?;

        for key in REQUIRED_KEYS {
            if raw.get(key).is_none() {
                return Err(DbError::Config(format!(
                    "config file {} missing required key: {}",
                    path.display(),
                    key
                )));
            }
        }

        let config: DbConfig = serde_json::from_value(raw)?;
        tracing::debug!(config = ?config, "configuration file loaded");
        Ok(config)
    }

    /// Build configuration from environment variables.
    ///
    /// Reads `MYSQL_HOST` (default `localhost`), `MYSQL_USER` (`root`),
    /// `MYSQL_PASSWORD` (empty), `MYSQL_DATABASE` (empty), `MYSQL_PORT`
    /// (3306), and `MYSQL_CHARSET` (`utf8mb4`).
    pub fn from_env() -> Result<Self> {
        let env = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let port_raw = env("MYSQL_PORT", "3306");
        let port: u16 = port_raw
            .parse()
            .map_err(|_| DbError::Config(format!("MYSQL_PORT is not a valid port: {}", port_raw)))?;

        let config = Self {
            host: env("MYSQL_HOST", "localhost"),
            user: env("MYSQL_USER", "root"),
            password: env("MYSQL_PASSWORD", ""),
            database: env("MYSQL_DATABASE", ""),
            port,
            charset: env("MYSQL_CHARSET", "utf8mb4"),
            connect_timeout_secs: default_connect_timeout(),
        };
        tracing::debug!(config = ?config, "configuration built from environment");
        Ok(config)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"******")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("charset", &self.charset)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}
