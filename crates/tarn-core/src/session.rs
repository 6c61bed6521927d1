//! Session and factory traits

use crate::{Result, Row, Value};
use async_trait::async_trait;
use std::sync::Arc;


/// One live backend database session.
///
/// A session is exclusively owned by whoever currently holds it: either it
/// sits idle in a pool or it is checked out by exactly one caller. It is
/// never shared between concurrent callers, so no method needs `&self`
/// synchronization.
#[async_trait]
pub trait Session: Send {
    /// Execute a read statement (SELECT) and return all rows in order
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a write statement (INSERT/UPDATE/DELETE) and return the
    /// affected-row count. Does not commit.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Commit the current transaction
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the current transaction
    async fn rollback(&mut self) -> Result<()>;

    /// Cheap no-op round-trip to the backend
    async fn ping(&mut self) -> Result<()>;

    /// Close the underlying connection. Further calls fail with a
    /// connection error.
    async fn close(&mut self) -> Result<()>;
}

/// Factory trait for opening new sessions
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    /// Open a new backend session
    async fn create(&self) -> Result<Box<dyn Session>>;

    /// Liveness probe: is an existing session still usable?
    ///
    /// Never errors; any underlying failure maps to `false`. Must not
    /// reconnect or mutate transaction state.
    async fn is_valid(&self, session: &mut dyn Session) -> bool {
        match session.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "liveness probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl<T: SessionFactory> SessionFactory for Arc<T> {
    async fn create(&self) -> Result<Box<dyn Session>> {
        (**self).create().await
    }

    async fn is_valid(&self, session: &mut dyn Session) -> bool {
        (**self).is_valid(session).await
    }
}
