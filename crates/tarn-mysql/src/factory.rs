//! MySQL session factory

use async_trait::async_trait;
use mysql_async::{Conn, Opts, OptsBuilder};
use tarn_core::{DbConfig, DbError, Result, Session, SessionFactory};

use crate::session::MySqlSession;

#[cfg(test)]
mod tests;

/// Opens MySQL sessions from a `DbConfig`.
///
/// Every session is initialized with `SET NAMES <charset>` and
/// `SET autocommit=0`, and the configured connect timeout bounds the
/// whole connection attempt including the handshake.
pub struct MySqlSessionFactory {
    config: DbConfig,
}

impl MySqlSessionFactory {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    /// The connection parameters this factory opens sessions with
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    fn build_opts(&self) -> Opts {
        let mut builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
            .init(vec![
                format!("SET NAMES {}", self.config.charset),
                "SET autocommit=0".to_string(),
            ]);
        if !self.config.database.is_empty() {
            builder = builder.db_name(Some(self.config.database.clone()));
        }
        builder.into()
    }
}

#[async_trait]
impl SessionFactory for MySqlSessionFactory {
    async fn create(&self) -> Result<Box<dyn Session>> {
        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            database = %self.config.database,
            "opening MySQL session"
        );

        let opts = self.build_opts();
        let timeout = self.config.connect_timeout();
        let conn = match tokio::time::timeout(timeout, Conn::new(opts)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                return Err(DbError::Connection(format!(
                    "failed to connect to MySQL at {}:{}: {}",
                    self.config.host, self.config.port, e
                )));
            }
            Err(_) => {
                return Err(DbError::Connection(format!(
                    "connection to {}:{} timed out after {:?}",
                    self.config.host, self.config.port, timeout
                )));
            }
        };

        tracing::debug!(host = %self.config.host, port = self.config.port, "MySQL session opened");
        Ok(Box::new(MySqlSession::new(conn)))
    }
}
