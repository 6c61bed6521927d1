//! Statement execution over scoped acquisition
//!
//! `query` and `execute` are the convenience surface most callers use: each
//! borrows a session from the pool for exactly one statement, applies the
//! commit/rollback discipline, and releases the session on every path.

use std::time::Instant;

use tarn_core::{Result, Row, Value};

use crate::pool::Pool;


impl Pool {
    /// Run a read statement on a pooled session and return all rows in
    /// order. Failures surface as `DbError::Query`. No implicit retry.
    #[tracing::instrument(
        skip(self, sql, params),
        fields(sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let started = Instant::now();
        let rows = self
            .with_session(|mut session| async move {
                let outcome = session.query(sql, params).await;
                (session, outcome)
            })
            .await?;
        tracing::debug!(
            row_count = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query executed"
        );
        Ok(rows)
    }

    /// Run a write statement on a pooled session, committing on success and
    /// rolling back on any failure before surfacing `DbError::Update`.
    ///
    /// Rollback failures are logged, not propagated, so the original error
    /// reaches the caller. Returns the affected-row count.
    #[tracing::instrument(
        skip(self, sql, params),
        fields(sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let started = Instant::now();
        let affected = self
            .with_session(|mut session| async move {
                let outcome = match session.execute(sql, params).await {
                    Ok(affected) => match session.commit().await {
                        Ok(()) => Ok(affected),
                        Err(commit_err) => {
                            tracing::error!(error = %commit_err, "commit failed, rolling back");
                            if let Err(e) = session.rollback().await {
                                tracing::warn!(error = %e, "rollback after failed commit also failed");
                            }
                            Err(commit_err)
                        }
                    },
                    Err(exec_err) => {
                        tracing::error!(error = %exec_err, "statement failed, rolling back");
                        if let Err(e) = session.rollback().await {
                            tracing::warn!(error = %e, "rollback after failed statement also failed");
                        }
                        Err(exec_err)
                    }
                };
                (session, outcome)
            })
            .await?;
        tracing::debug!(
            affected_rows = affected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "statement executed"
        );
        Ok(affected)
    }
}
